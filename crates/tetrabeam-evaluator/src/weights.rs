//! Weight tables: per-phase coefficients and multiplier tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feature::{Feature, FeatureVector};

/// Game progress class selecting which coefficient set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Early,
    Mid,
    Late,
}

impl GamePhase {
    pub const ALL: [Self; 3] = [Self::Early, Self::Mid, Self::Late];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Mid => "mid",
            Self::Late => "late",
        }
    }
}

/// Line and level counts at which the game enters the mid and late phases.
///
/// The phase is the later of the line-based and the level-based phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseThresholds {
    pub mid_lines: u32,
    pub late_lines: u32,
    pub mid_level: u32,
    pub late_level: u32,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            mid_lines: 30,
            late_lines: 90,
            mid_level: 3,
            late_level: 9,
        }
    }
}

impl PhaseThresholds {
    #[must_use]
    pub fn phase_for(&self, lines: u32, level: u32) -> GamePhase {
        let by_lines = Self::classify(lines, self.mid_lines, self.late_lines);
        let by_level = Self::classify(level, self.mid_level, self.late_level);
        by_lines.max(by_level)
    }

    fn classify(value: u32, mid: u32, late: u32) -> GamePhase {
        if value >= late {
            GamePhase::Late
        } else if value >= mid {
            GamePhase::Mid
        } else {
            GamePhase::Early
        }
    }
}

/// A named coefficient for every feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationWeights {
    pub landing_height: f32,
    pub lines_cleared: f32,
    pub potential_lines: f32,
    pub row_transitions: f32,
    pub column_transitions: f32,
    pub holes: f32,
    pub wells: f32,
    pub blocks_above_holes: f32,
    pub well_open: f32,
    pub escape_route: f32,
    pub bumpiness: f32,
    pub max_height: f32,
    pub row_fill_ratio: f32,
}

impl EvaluationWeights {
    pub const ZERO: Self = Self {
        landing_height: 0.0,
        lines_cleared: 0.0,
        potential_lines: 0.0,
        row_transitions: 0.0,
        column_transitions: 0.0,
        holes: 0.0,
        wells: 0.0,
        blocks_above_holes: 0.0,
        well_open: 0.0,
        escape_route: 0.0,
        bumpiness: 0.0,
        max_height: 0.0,
        row_fill_ratio: 0.0,
    };

    #[must_use]
    pub fn from_vector(values: &FeatureVector) -> Self {
        let mut weights = Self::ZERO;
        for (feature, value) in values.iter() {
            weights.set(feature, value);
        }
        weights
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f32 {
        match feature {
            Feature::LandingHeight => self.landing_height,
            Feature::LinesCleared => self.lines_cleared,
            Feature::PotentialLines => self.potential_lines,
            Feature::RowTransitions => self.row_transitions,
            Feature::ColumnTransitions => self.column_transitions,
            Feature::Holes => self.holes,
            Feature::Wells => self.wells,
            Feature::BlocksAboveHoles => self.blocks_above_holes,
            Feature::WellOpen => self.well_open,
            Feature::EscapeRoute => self.escape_route,
            Feature::Bumpiness => self.bumpiness,
            Feature::MaxHeight => self.max_height,
            Feature::RowFillRatio => self.row_fill_ratio,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f32) {
        let slot = match feature {
            Feature::LandingHeight => &mut self.landing_height,
            Feature::LinesCleared => &mut self.lines_cleared,
            Feature::PotentialLines => &mut self.potential_lines,
            Feature::RowTransitions => &mut self.row_transitions,
            Feature::ColumnTransitions => &mut self.column_transitions,
            Feature::Holes => &mut self.holes,
            Feature::Wells => &mut self.wells,
            Feature::BlocksAboveHoles => &mut self.blocks_above_holes,
            Feature::WellOpen => &mut self.well_open,
            Feature::EscapeRoute => &mut self.escape_route,
            Feature::Bumpiness => &mut self.bumpiness,
            Feature::MaxHeight => &mut self.max_height,
            Feature::RowFillRatio => &mut self.row_fill_ratio,
        };
        *slot = value;
    }

    #[must_use]
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::from_fn(|feature| self.get(feature))
    }
}

/// One [`EvaluationWeights`] per [`GamePhase`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub early: EvaluationWeights,
    pub mid: EvaluationWeights,
    pub late: EvaluationWeights,
}

impl PhaseWeights {
    #[must_use]
    pub fn get(&self, phase: GamePhase) -> &EvaluationWeights {
        match phase {
            GamePhase::Early => &self.early,
            GamePhase::Mid => &self.mid,
            GamePhase::Late => &self.late,
        }
    }
}

/// Per-feature multipliers; features not listed are left unchanged.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientTable(BTreeMap<Feature, f32>);

impl CoefficientTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, factor: f32) -> Self {
        self.0.insert(feature, factor);
        self
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f32> {
        self.0.get(&feature).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f32)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    /// Multiplies every listed coefficient of `weights` in place.
    pub fn apply(&self, weights: &mut FeatureVector) {
        for (feature, factor) in self.iter() {
            weights.set(feature, weights.get(feature) * factor);
        }
    }
}

impl FromIterator<(Feature, f32)> for CoefficientTable {
    fn from_iter<T: IntoIterator<Item = (Feature, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_is_later_of_lines_and_level() {
        let thresholds = PhaseThresholds::default();
        assert_eq!(thresholds.phase_for(0, 0), GamePhase::Early);
        assert_eq!(thresholds.phase_for(29, 2), GamePhase::Early);
        assert_eq!(thresholds.phase_for(30, 0), GamePhase::Mid);
        assert_eq!(thresholds.phase_for(0, 3), GamePhase::Mid);
        assert_eq!(thresholds.phase_for(45, 9), GamePhase::Late);
        assert_eq!(thresholds.phase_for(90, 0), GamePhase::Late);
    }

    #[test]
    fn test_weights_get_set_cover_every_feature() {
        let mut weights = EvaluationWeights::ZERO;
        for (i, feature) in Feature::ALL.into_iter().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            let value = i as f32 + 1.0;
            weights.set(feature, value);
        }
        let vector = weights.to_vector();
        for (i, (feature, value)) in vector.iter().enumerate() {
            assert_eq!(Feature::ALL[i], feature);
            assert!((value - weights.get(feature)).abs() < f32::EPSILON);
        }

        // serde field names are the feature names
        let json = serde_json::to_value(weights).unwrap();
        for feature in Feature::ALL {
            assert!(json.get(feature.name()).is_some(), "{feature}");
        }
    }

    #[test]
    fn test_coefficient_table_multiplies_listed_features() {
        let table = CoefficientTable::new()
            .with(Feature::Holes, 2.0)
            .with(Feature::MaxHeight, 0.0);
        let mut weights = FeatureVector::from_fn(|_| -3.0);
        table.apply(&mut weights);
        assert!((weights[Feature::Holes] + 6.0).abs() < f32::EPSILON);
        assert!(weights[Feature::MaxHeight].abs() < f32::EPSILON);
        assert!((weights[Feature::Bumpiness] + 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_coefficient_table_serde() {
        let table: CoefficientTable =
            serde_json::from_str(r#"{ "holes": 1.5, "lines_cleared": 2 }"#).unwrap();
        assert_eq!(table.get(Feature::Holes), Some(1.5));
        assert_eq!(table.get(Feature::LinesCleared), Some(2.0));
        assert_eq!(table.get(Feature::Wells), None);
        assert!(serde_json::from_str::<CoefficientTable>(r#"{ "hole": 1.0 }"#).is_err());
    }
}
