//! Audio collaborator interface
//!
//! The game only says *what* happened; an `AudioSink` decides how (or
//! whether) it sounds. Nothing a sink does feeds back into gameplay.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Menu navigation and toggles
    Ui,
    /// Menu confirm that starts or resumes play
    Start,
    /// Coin collected
    Coin,
    NearMiss,
    /// Non-fatal hit
    Crash,
    GameOver,
    /// Heal pickup
    Repair,
    Boost,
}

impl SoundEffect {
    /// Event name as used by sound banks
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Ui => "ui",
            SoundEffect::Start => "start",
            SoundEffect::Coin => "coin",
            SoundEffect::NearMiss => "nearMiss",
            SoundEffect::Crash => "crash",
            SoundEffect::GameOver => "gameOver",
            SoundEffect::Repair => "repair",
            SoundEffect::Boost => "boost",
        }
    }
}

/// Something that can play game sounds
///
/// Implementations must never fail loudly: an unavailable device plays nothing.
pub trait AudioSink {
    fn play_sound(&mut self, effect: SoundEffect, settings: &Settings);
    fn start_music(&mut self);
    fn stop_music(&mut self);
    /// Unlock output after the first user gesture
    fn resume(&mut self) {}
    fn update_volumes(&mut self, _settings: &Settings) {}
}

/// No audio device
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_sound(&mut self, _effect: SoundEffect, _settings: &Settings) {}
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
}

/// Writes sound events to the log instead of a speaker
#[derive(Debug, Default)]
pub struct LoggingAudio {
    music_playing: bool,
    played: u64,
}

impl LoggingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn music_playing(&self) -> bool {
        self.music_playing
    }

    /// Number of sound effects that were audible
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for LoggingAudio {
    fn play_sound(&mut self, effect: SoundEffect, settings: &Settings) {
        let volume = settings.effective_sfx_volume();
        if volume <= 0.0 {
            return;
        }
        self.played += 1;
        log::trace!("sound {} at {:.2}", effect.name(), volume);
    }

    fn start_music(&mut self) {
        if !self.music_playing {
            log::debug!("music started");
        }
        self.music_playing = true;
    }

    fn stop_music(&mut self) {
        if self.music_playing {
            log::debug!("music stopped");
        }
        self.music_playing = false;
    }

    fn update_volumes(&mut self, settings: &Settings) {
        log::debug!(
            "volumes: sfx {:.2}, music {:.2}",
            settings.effective_sfx_volume(),
            settings.effective_music_volume()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(SoundEffect::NearMiss.name(), "nearMiss");
        assert_eq!(SoundEffect::GameOver.name(), "gameOver");
        assert_eq!(SoundEffect::Repair.name(), "repair");
    }

    #[test]
    fn test_logging_audio_respects_sound_toggle() {
        let mut audio = LoggingAudio::new();
        let mut settings = Settings::default();
        audio.play_sound(SoundEffect::Coin, &settings);
        settings.sound_enabled = false;
        audio.play_sound(SoundEffect::Coin, &settings);
        assert_eq!(audio.played(), 1);
    }

    #[test]
    fn test_logging_audio_music_state() {
        let mut audio = LoggingAudio::new();
        audio.start_music();
        assert!(audio.music_playing());
        audio.stop_music();
        audio.stop_music();
        assert!(!audio.music_playing());
    }
}
