//! Situational multiplier tables and the board conditions that activate them.
//!
//! Situations are data: each one pairs a [`Trigger`] (conditions over board
//! metrics) with a [`CoefficientTable`] multiplied into the phase weights
//! while the trigger holds. Retuning a situation never requires code changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{board_analysis::BoardAnalysis, weights::CoefficientTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationKind {
    DangerZone,
    Survival,
    Cleanup,
}

impl SituationKind {
    pub const ALL: [Self; 3] = [Self::DangerZone, Self::Survival, Self::Cleanup];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DangerZone => "danger_zone",
            Self::Survival => "survival",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for SituationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Board measurement a trigger condition compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardMetric {
    MaxHeight,
    Holes,
    OccupiedCells,
    Bumpiness,
}

impl BoardMetric {
    pub const NAMES: [&'static str; 4] = ["max_height", "holes", "occupied_cells", "bumpiness"];

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn measure(self, analysis: &BoardAnalysis) -> f32 {
        match self {
            Self::MaxHeight => f32::from(analysis.max_height()),
            Self::Holes => analysis.holes() as f32,
            Self::OccupiedCells => analysis.occupied_cells() as f32,
            Self::Bumpiness => analysis.bumpiness() as f32,
        }
    }
}

/// `at_least <= metric <= at_most`, either bound optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub metric: BoardMetric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_least: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_most: Option<f32>,
}

impl Condition {
    #[must_use]
    pub fn at_least(metric: BoardMetric, value: f32) -> Self {
        Self {
            metric,
            at_least: Some(value),
            at_most: None,
        }
    }

    #[must_use]
    pub fn at_most(metric: BoardMetric, value: f32) -> Self {
        Self {
            metric,
            at_least: None,
            at_most: Some(value),
        }
    }

    #[must_use]
    pub fn holds(&self, analysis: &BoardAnalysis) -> bool {
        let value = self.metric.measure(analysis);
        self.at_least.is_none_or(|min| value >= min) && self.at_most.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    All,
    Any,
}

/// A trigger with no conditions never fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub mode: TriggerMode,
    pub conditions: Vec<Condition>,
}

impl Trigger {
    #[must_use]
    pub fn is_active(&self, analysis: &BoardAnalysis) -> bool {
        if self.conditions.is_empty() {
            return false;
        }
        match self.mode {
            TriggerMode::All => self.conditions.iter().all(|c| c.holds(analysis)),
            TriggerMode::Any => self.conditions.iter().any(|c| c.holds(analysis)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub trigger: Trigger,
    pub multipliers: CoefficientTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situations {
    pub danger_zone: Situation,
    pub survival: Situation,
    pub cleanup: Situation,
}

impl Situations {
    #[must_use]
    pub fn get(&self, kind: SituationKind) -> &Situation {
        match kind {
            SituationKind::DangerZone => &self.danger_zone,
            SituationKind::Survival => &self.survival,
            SituationKind::Cleanup => &self.cleanup,
        }
    }

    /// Situations whose trigger holds on `analysis`, in [`SituationKind::ALL`] order.
    pub fn active<'a>(&'a self, analysis: &'a BoardAnalysis) -> impl Iterator<Item = SituationKind> + 'a {
        SituationKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).trigger.is_active(analysis))
    }
}

#[cfg(test)]
mod tests {
    use tetrabeam_engine::BitBoard;

    use super::*;
    use crate::weight_config::WeightConfiguration;

    fn analyze(art: &str) -> BoardAnalysis {
        BoardAnalysis::new(BitBoard::from_ascii(art))
    }

    #[test]
    fn test_condition_bounds() {
        let analysis = analyze(
            "
            #.........
            ##........
            ",
        );
        assert!(Condition::at_least(BoardMetric::MaxHeight, 2.0).holds(&analysis));
        assert!(!Condition::at_least(BoardMetric::MaxHeight, 3.0).holds(&analysis));
        assert!(Condition::at_most(BoardMetric::OccupiedCells, 3.0).holds(&analysis));
        assert!(!Condition::at_most(BoardMetric::Bumpiness, 1.0).holds(&analysis));
    }

    #[test]
    fn test_trigger_modes() {
        let analysis = analyze("#.........");
        let conditions = vec![
            Condition::at_least(BoardMetric::MaxHeight, 1.0),
            Condition::at_least(BoardMetric::Holes, 1.0),
        ];
        let all = Trigger {
            mode: TriggerMode::All,
            conditions: conditions.clone(),
        };
        let any = Trigger {
            mode: TriggerMode::Any,
            conditions,
        };
        assert!(!all.is_active(&analysis));
        assert!(any.is_active(&analysis));

        let empty = Trigger {
            mode: TriggerMode::All,
            conditions: vec![],
        };
        assert!(!empty.is_active(&analysis));
    }

    #[test]
    fn test_builtin_situations() {
        let config = WeightConfiguration::builtin();
        let situations = &config.situations;

        let empty = BoardAnalysis::new(BitBoard::EMPTY);
        assert_eq!(situations.active(&empty).count(), 0);

        let low = analyze("####......");
        assert_eq!(situations.active(&low).collect::<Vec<_>>(), [SituationKind::Cleanup]);

        let mut tall = BitBoard::EMPTY;
        for row in 6..BitBoard::HEIGHT {
            tall.set_cell(row, 0);
        }
        let tall = BoardAnalysis::new(tall);
        assert_eq!(
            situations.active(&tall).collect::<Vec<_>>(),
            [SituationKind::DangerZone, SituationKind::Survival]
        );
    }
}
