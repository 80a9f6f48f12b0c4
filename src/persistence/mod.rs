//! Settings, high score and keybind persistence
//!
//! Features:
//! - Versioned key namespace (`flipphone-racer-v1.0.0-<name>`)
//! - Field-by-field merge over defaults on load, so old or partly corrupt
//!   records keep every field that still parses
//! - Storage failures are logged and degrade to defaults, never to errors

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::highscores::HighScores;
use crate::platform::input::Action;
use crate::platform::storage::{KeyValueStore, StorageError};
use crate::settings::{Difficulty, Settings};

pub const KEY_PREFIX: &str = "flipphone-racer-";
pub const STORAGE_VERSION: &str = "1.0.0";

const SETTINGS_KEY: &str = "settings";
const HIGH_SCORES_KEY: &str = "highScores";
const KEYBINDS_KEY: &str = "keybinds";

/// Typed access to the game's persisted records
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Full storage key for a record name
    pub fn key(name: &str) -> String {
        format!("{KEY_PREFIX}v{STORAGE_VERSION}-{name}")
    }

    pub fn load_settings(&self) -> Settings {
        match self.load_value(SETTINGS_KEY) {
            Some(saved) => {
                log::info!("Loaded settings");
                merge_over_defaults::<Settings>(saved).sanitized()
            }
            None => {
                log::info!("Using default settings");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) -> bool {
        self.save_value(SETTINGS_KEY, settings)
    }

    pub fn load_high_scores(&self) -> HighScores {
        self.load_value(HIGH_SCORES_KEY)
            .map(merge_over_defaults::<HighScores>)
            .unwrap_or_default()
    }

    /// Record a finished run; returns true if the stored best improved
    pub fn save_high_score(&mut self, difficulty: Difficulty, score: f64, distance: f64) -> bool {
        let mut scores = self.load_high_scores();
        if !scores.record(difficulty, score, distance) {
            return false;
        }
        if self.save_value(HIGH_SCORES_KEY, &scores) {
            log::info!(
                "New {} record: score {:.0}, distance {:.0}",
                difficulty.as_str(),
                scores.get(difficulty).score,
                scores.get(difficulty).distance
            );
        }
        true
    }

    /// User key overrides; entries naming an unknown action are dropped
    pub fn load_keybinds(&self) -> BTreeMap<String, Action> {
        let Some(Value::Object(saved)) = self.load_value(KEYBINDS_KEY) else {
            return BTreeMap::new();
        };
        saved
            .into_iter()
            .filter_map(|(code, action)| match serde_json::from_value::<Action>(action) {
                Ok(action) => Some((code, action)),
                Err(_) => {
                    log::warn!("Ignoring keybind for {code}: unknown action");
                    None
                }
            })
            .collect()
    }

    pub fn save_keybinds(&mut self, keybinds: &BTreeMap<String, Action>) -> bool {
        self.save_value(KEYBINDS_KEY, keybinds)
    }

    fn load_value(&self, name: &str) -> Option<Value> {
        let key = Self::key(name);
        let text = match self.store.get(&key) {
            Ok(text) => text?,
            Err(e) => {
                log::warn!("Failed to read {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding corrupt {key}: {e}");
                None
            }
        }
    }

    fn save_value<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> bool {
        let key = Self::key(name);
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save {key}: {e}");
                false
            }
        }
    }
}

/// Overlay each saved top-level field onto `T::default()`
///
/// Unknown fields are ignored; a field whose value does not parse keeps its
/// default while its siblings are still taken.
fn merge_over_defaults<T>(saved: Value) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let defaults = T::default();
    let Value::Object(saved) = saved else {
        log::warn!("Saved record is not an object, using defaults");
        return defaults;
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
        return defaults;
    };

    for (field, value) in saved {
        if !merged.contains_key(&field) {
            continue;
        }
        let mut candidate = merged.clone();
        candidate.insert(field.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(candidate)).is_ok() {
            merged.insert(field, value);
        } else {
            log::warn!("Ignoring malformed saved field {field}");
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::{FileStore, MemoryStore};
    use crate::settings::TouchLayout;

    /// Store that fails every call
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("broken".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("broken".to_string()))
        }
    }

    fn memory() -> Persistence {
        Persistence::new(Box::new(MemoryStore::new()))
    }

    fn custom_settings() -> Settings {
        Settings {
            sound_enabled: false,
            music_enabled: false,
            reduced_motion: true,
            colorblind_mode: true,
            difficulty: Difficulty::Hard,
            touch_layout: TouchLayout::WithBrake,
            master_volume: 0.3,
            sfx_volume: 0.9,
            music_volume: 0.1,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(Persistence::key("settings"), "flipphone-racer-v1.0.0-settings");
    }

    #[test]
    fn test_settings_round_trip() {
        let mut p = memory();
        assert_eq!(p.load_settings(), Settings::default());

        let settings = custom_settings();
        assert!(p.save_settings(&settings));
        assert_eq!(p.load_settings(), settings);
    }

    #[test]
    fn test_missing_field_takes_default_only_for_itself() {
        let mut store = MemoryStore::new();
        let mut record = serde_json::to_value(custom_settings()).unwrap();
        record.as_object_mut().unwrap().remove("colorblindMode");
        store
            .set(&Persistence::key("settings"), &record.to_string())
            .unwrap();

        let loaded = Persistence::new(Box::new(store)).load_settings();
        assert!(!loaded.colorblind_mode);
        assert_eq!(
            loaded,
            Settings {
                colorblind_mode: false,
                ..custom_settings()
            }
        );
    }

    #[test]
    fn test_malformed_and_unknown_fields() {
        let mut store = MemoryStore::new();
        store
            .set(
                &Persistence::key("settings"),
                r#"{"soundEnabled":"loud","difficulty":"hard","future":42,"masterVolume":7}"#,
            )
            .unwrap();

        let loaded = Persistence::new(Box::new(store)).load_settings();
        assert!(loaded.sound_enabled);
        assert_eq!(loaded.difficulty, Difficulty::Hard);
        assert_eq!(loaded.master_volume, 1.0);
    }

    #[test]
    fn test_corrupt_json_falls_back() {
        let mut store = MemoryStore::new();
        store.set(&Persistence::key("settings"), "{not json").unwrap();
        store.set(&Persistence::key("highScores"), "[]").unwrap();
        let p = Persistence::new(Box::new(store));
        assert_eq!(p.load_settings(), Settings::default());
        assert_eq!(p.load_high_scores(), HighScores::default());
    }

    #[test]
    fn test_high_scores() {
        let mut p = memory();
        assert!(p.save_high_score(Difficulty::Normal, 5000.0, 900.0));
        assert!(!p.save_high_score(Difficulty::Normal, 4000.0, 800.0));
        assert!(p.save_high_score(Difficulty::Normal, 100.0, 1000.0));

        let scores = p.load_high_scores();
        assert_eq!(scores.normal.score, 5000.0);
        assert_eq!(scores.normal.distance, 1000.0);
        assert_eq!(scores.easy.score, 0.0);
    }

    #[test]
    fn test_keybinds_round_trip() {
        let mut p = memory();
        assert!(p.load_keybinds().is_empty());

        let mut binds = BTreeMap::new();
        binds.insert("KeyQ".to_string(), Action::Left);
        binds.insert("KeyE".to_string(), Action::Right);
        assert!(p.save_keybinds(&binds));
        assert_eq!(p.load_keybinds(), binds);
    }

    #[test]
    fn test_keybinds_drop_unknown_actions() {
        let mut store = MemoryStore::new();
        store
            .set(&Persistence::key("keybinds"), r#"{"KeyQ":"left","KeyX":"jump"}"#)
            .unwrap();
        let binds = Persistence::new(Box::new(store)).load_keybinds();
        assert_eq!(binds.len(), 1);
        assert_eq!(binds.get("KeyQ"), Some(&Action::Left));
    }

    #[test]
    fn test_broken_store_degrades() {
        let mut p = Persistence::new(Box::new(BrokenStore));
        assert_eq!(p.load_settings(), Settings::default());
        assert!(!p.save_settings(&Settings::default()));
        assert!(p.load_keybinds().is_empty());
        // The run still counts as a record even though it could not be written
        assert!(p.save_high_score(Difficulty::Easy, 10.0, 1.0));
    }

    #[test]
    fn test_file_backed_persistence() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut p = Persistence::new(Box::new(FileStore::new(dir.path())));
            assert!(p.save_settings(&custom_settings()));
            p.save_high_score(Difficulty::Hard, 123.0, 45.0);
        }
        let p = Persistence::new(Box::new(FileStore::new(dir.path())));
        assert_eq!(p.load_settings(), custom_settings());
        assert_eq!(p.load_high_scores().hard.score, 123.0);
    }
}
