//! Local score table shown on the leaderboard screen. Lives only for the process lifetime.

use bevy::prelude::*;

/// Entries kept; older low scores fall off the bottom.
pub const MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub survival_secs: u32,
}

/// Runs sorted by score, best first. Ties keep insertion order.
#[derive(Resource, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn record(&mut self, name: impl Into<String>, score: u32, survival_secs: u32) {
        let at = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(
            at,
            ScoreEntry {
                name: name.into(),
                score,
                survival_secs,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn top(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
