//! Best results per difficulty
//!
//! Score and distance are tracked as independent maxima, so a record can
//! come from two different runs.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Best score and distance for one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScoreEntry {
    pub score: f64,
    pub distance: f64,
}

impl HighScoreEntry {
    /// True if either figure beats the stored one
    pub fn is_beaten_by(&self, score: f64, distance: f64) -> bool {
        score > self.score || distance > self.distance
    }
}

/// High score table keyed by difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub easy: HighScoreEntry,
    pub normal: HighScoreEntry,
    pub hard: HighScoreEntry,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, difficulty: Difficulty) -> HighScoreEntry {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }

    fn entry_mut(&mut self, difficulty: Difficulty) -> &mut HighScoreEntry {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Fold a finished run into the table
    ///
    /// Returns true if anything improved.
    pub fn record(&mut self, difficulty: Difficulty, score: f64, distance: f64) -> bool {
        let entry = self.entry_mut(difficulty);
        if !entry.is_beaten_by(score, distance) {
            return false;
        }
        entry.score = entry.score.max(score);
        entry.distance = entry.distance.max(distance);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_improves() {
        let mut scores = HighScores::new();
        assert!(scores.record(Difficulty::Normal, 1200.0, 300.0));
        assert_eq!(scores.get(Difficulty::Normal).score, 1200.0);
        assert_eq!(scores.get(Difficulty::Easy), HighScoreEntry::default());
    }

    #[test]
    fn test_independent_maxima() {
        let mut scores = HighScores::new();
        scores.record(Difficulty::Hard, 1000.0, 500.0);

        // Better distance, worse score: only distance moves
        assert!(scores.record(Difficulty::Hard, 400.0, 800.0));
        let hard = scores.get(Difficulty::Hard);
        assert_eq!(hard.score, 1000.0);
        assert_eq!(hard.distance, 800.0);

        // Neither improves
        assert!(!scores.record(Difficulty::Hard, 999.0, 800.0));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(HighScores::new()).unwrap();
        assert_eq!(json["normal"]["score"], 0.0);
        assert_eq!(json["hard"]["distance"], 0.0);
    }
}
