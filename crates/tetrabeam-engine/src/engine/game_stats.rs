use serde::{Deserialize, Serialize};

/// Points per lock, indexed by the number of lines cleared at once.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Awarded on top of the line score when a lock empties the board.
const PERFECT_CLEAR_SCORE: u64 = 2000;

/// Running totals of a headless game.
///
/// Scoring is deliberately plain: no combos, no back-to-back, no T-spin
/// bonuses. Level is one per ten lines.
///
/// ```
/// use tetrabeam_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4, false);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.lines(), 4);
/// assert_eq!(stats.line_clear_counts()[4], 1);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    pieces: u64,
    lines: u32,
    line_clear_counts: [u64; 5],
    perfect_clears: u64,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            pieces: 0,
            lines: 0,
            line_clear_counts: [0; 5],
            perfect_clears: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.lines / 10
    }

    #[must_use]
    pub const fn lines(&self) -> u32 {
        self.lines
    }

    /// Number of pieces locked so far.
    #[must_use]
    pub const fn pieces(&self) -> u64 {
        self.pieces
    }

    /// Locks per clear size: `[0]` no clear, `[1]` singles ... `[4]` quads.
    #[must_use]
    pub const fn line_clear_counts(&self) -> &[u64; 5] {
        &self.line_clear_counts
    }

    #[must_use]
    pub const fn perfect_clears(&self) -> u64 {
        self.perfect_clears
    }

    pub fn record_lock(&mut self, cleared_lines: usize, perfect_clear: bool) {
        let index = cleared_lines.min(SCORE_TABLE.len() - 1);
        self.pieces += 1;
        self.lines += u32::try_from(cleared_lines).unwrap_or(u32::MAX);
        self.line_clear_counts[index] += 1;
        self.score += SCORE_TABLE[index];
        if perfect_clear {
            self.perfect_clears += 1;
            self.score += PERFECT_CLEAR_SCORE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_follows_lines() {
        let mut stats = GameStats::new();
        for _ in 0..9 {
            stats.record_lock(1, false);
        }
        assert_eq!(stats.level(), 0);
        stats.record_lock(2, false);
        assert_eq!(stats.lines(), 11);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.pieces(), 10);
        assert_eq!(stats.score(), 9 * 100 + 300);
    }

    #[test]
    fn test_perfect_clear_bonus() {
        let mut stats = GameStats::new();
        stats.record_lock(0, false);
        stats.record_lock(2, true);
        assert_eq!(stats.perfect_clears(), 1);
        assert_eq!(stats.score(), 300 + PERFECT_CLEAR_SCORE);
        assert_eq!(stats.line_clear_counts(), &[1, 0, 1, 0, 0]);
    }
}
