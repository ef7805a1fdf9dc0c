#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match score bookkeeping backed by a persistent [`ScoreStore`].
//!
//! The manager tracks three figures: the score of the running match, the
//! all-time high score, and the cumulative score of every completed match.
//! The latter two live in the store under [`HIGH_SCORE_KEY`] and
//! [`CUMULATIVE_SCORE_KEY`]. Persistence failures are logged and otherwise
//! ignored so a broken store never interrupts a match.

use tracing::{debug, warn};
use zombie_io_core::{Event, ScoreStore, CUMULATIVE_SCORE_KEY, HIGH_SCORE_KEY};

/// Tracks match, high, and cumulative scores.
#[derive(Debug)]
pub struct ScoreManager<S> {
    store: S,
    match_score: i64,
    high_score: i64,
    cumulative_score: i64,
    new_record: bool,
}

impl<S: ScoreStore> ScoreManager<S> {
    /// Creates a manager seeded with the values persisted in `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        let high_score = store.load(HIGH_SCORE_KEY, 0);
        let cumulative_score = store.load(CUMULATIVE_SCORE_KEY, 0);
        Self {
            store,
            match_score: 0,
            high_score,
            cumulative_score,
            new_record: false,
        }
    }

    /// Resets the match score and the new-record flag.
    pub fn start_match(&mut self) {
        self.match_score = 0;
        self.new_record = false;
    }

    /// Credits `amount` to the running match.
    ///
    /// Emits [`Event::ScoreChanged`] and, when the match score strictly
    /// exceeds the high score, persists it and emits [`Event::HighScoreChanged`].
    pub fn add_score(&mut self, amount: u32, out: &mut Vec<Event>) {
        self.match_score = self.match_score.saturating_add(i64::from(amount));
        out.push(Event::ScoreChanged {
            score: self.match_score,
        });

        if self.match_score <= self.high_score {
            return;
        }

        self.high_score = self.match_score;
        self.new_record = true;
        self.persist(HIGH_SCORE_KEY, self.high_score);
        out.push(Event::HighScoreChanged {
            score: self.high_score,
        });
    }

    /// Folds the match score into the cumulative score and persists it.
    pub fn complete_match(&mut self) {
        self.cumulative_score = self
            .cumulative_score
            .saturating_add(self.match_score)
            .max(0);
        debug!(
            match_score = self.match_score,
            cumulative = self.cumulative_score,
            "match completed"
        );
        self.persist(CUMULATIVE_SCORE_KEY, self.cumulative_score);
    }

    /// Score accumulated during the running or last match.
    #[must_use]
    pub const fn match_score(&self) -> i64 {
        self.match_score
    }

    /// Best match score ever recorded.
    #[must_use]
    pub const fn high_score(&self) -> i64 {
        self.high_score
    }

    /// Sum of every completed match score.
    #[must_use]
    pub const fn cumulative_score(&self) -> i64 {
        self.cumulative_score
    }

    /// Whether the running or last match set a new high score.
    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        self.new_record
    }

    /// Read-only access to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the manager and returns the backing store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self, key: &str, value: i64) {
        if let Err(error) = self.store.save(key, value) {
            warn!(key, value, %error, "failed to persist score");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, convert::Infallible};

    use super::*;

    #[derive(Debug, Default)]
    struct MapStore(HashMap<String, i64>);

    impl ScoreStore for MapStore {
        type Error = Infallible;

        fn load(&self, key: &str, default: i64) -> i64 {
            self.0.get(key).copied().unwrap_or(default)
        }

        fn save(&mut self, key: &str, value: i64) -> Result<(), Self::Error> {
            let _ = self.0.insert(key.to_owned(), value);
            Ok(())
        }
    }

    #[test]
    fn negative_cumulative_score_is_floored() {
        let mut store = MapStore::default();
        let _ = store.save(CUMULATIVE_SCORE_KEY, -40);
        let mut scores = ScoreManager::new(store);
        scores.start_match();
        scores.complete_match();
        assert_eq!(scores.cumulative_score(), 0);
        assert_eq!(scores.store().load(CUMULATIVE_SCORE_KEY, -1), 0);
    }

    #[test]
    fn equalling_the_high_score_is_not_a_record() {
        let mut store = MapStore::default();
        let _ = store.save(HIGH_SCORE_KEY, 20);
        let mut scores = ScoreManager::new(store);
        scores.start_match();

        let mut events = Vec::new();
        scores.add_score(10, &mut events);
        scores.add_score(10, &mut events);
        assert!(!scores.is_new_record());
        assert_eq!(
            events,
            vec![Event::ScoreChanged { score: 10 }, Event::ScoreChanged { score: 20 }]
        );
    }
}
