//! Score, level and lives for one match
//!
//! Mutated only by the engine; the HUD reads through the accessors.

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    score: u64,
    high_score: u64,
    lives: u32,
    max_lives: u32,
    level: u32,
    paused: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(STARTING_LIVES)
    }
}

impl Session {
    pub fn new(max_lives: u32) -> Self {
        Self {
            score: 0,
            high_score: 0,
            lives: max_lives,
            max_lives,
            level: 1,
            paused: false,
        }
    }

    /// Reset score, lives and level; the high score survives
    pub fn new_game(&mut self) {
        self.score = 0;
        self.lives = self.max_lives;
        self.level = 1;
        self.paused = false;
    }

    /// Add points, dragging the high score up with the score
    pub fn increase_score(&mut self, points: u64) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }

    pub fn advance_level(&mut self) {
        self.level += 1;
    }

    /// Deduct a life, never going below zero; returns the lives left
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Final score equals the best seen (end screen says "well done")
    pub fn is_new_best(&self) -> bool {
        self.score >= self.high_score
    }

    #[cfg(test)]
    pub(crate) fn set_counters(&mut self, score: u64, high_score: u64, lives: u32, level: u32) {
        self.score = score;
        self.high_score = high_score;
        self.lives = lives;
        self.level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_follows_score() {
        let mut session = Session::default();
        session.set_counters(95, 90, 4, 1);
        session.increase_score(10);
        assert_eq!(session.score(), 105);
        assert_eq!(session.high_score(), 105);
    }

    #[test]
    fn test_high_score_never_decreases() {
        let mut session = Session::default();
        session.increase_score(500);
        session.new_game();
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 500);
        session.increase_score(10);
        assert_eq!(session.high_score(), 500);
        assert!(!session.is_new_best());
    }

    #[test]
    fn test_scoreless_first_game_ties_best() {
        let session = Session::new(4);
        assert_eq!(session.high_score(), 0);
        assert!(session.is_new_best());
    }

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut session = Session::new(4);
        assert_eq!(session.lose_life(), 3);
        assert_eq!(session.lose_life(), 2);
        assert_eq!(session.lose_life(), 1);
        assert_eq!(session.lose_life(), 0);
        assert_eq!(session.lose_life(), 0);
    }

    #[test]
    fn test_new_game_resets_level() {
        let mut session = Session::default();
        session.advance_level();
        session.advance_level();
        session.lose_life();
        assert_eq!(session.level(), 3);
        session.new_game();
        assert_eq!(session.level(), 1);
        assert_eq!(session.lives(), session.max_lives());
    }
}
