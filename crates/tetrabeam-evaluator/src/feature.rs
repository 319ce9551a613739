//! The evaluation feature set.
//!
//! Every feature is a pure function of a [`PlacementAnalysis`]: the board after
//! the piece locked and its rows cleared, plus where the piece landed. Values
//! are raw measurements (counts, heights, ratios); the sign and scale of their
//! contribution come entirely from the weight tables.
//!
//! # Survival
//!
//! - [`Feature::Holes`], [`Feature::BlocksAboveHoles`] - covered empty cells
//! - [`Feature::MaxHeight`], [`Feature::LandingHeight`] - how close to top-out
//!
//! # Structure
//!
//! - [`Feature::RowTransitions`], [`Feature::ColumnTransitions`] - fragmentation
//! - [`Feature::Wells`], [`Feature::Bumpiness`] - surface shape
//! - [`Feature::WellOpen`], [`Feature::EscapeRoute`] - what the surface still accepts
//!
//! # Score
//!
//! - [`Feature::LinesCleared`], [`Feature::PotentialLines`], [`Feature::RowFillRatio`]

use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize, ser::SerializeMap};

use crate::placement_analysis::PlacementAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LandingHeight,
    LinesCleared,
    PotentialLines,
    RowTransitions,
    ColumnTransitions,
    Holes,
    Wells,
    BlocksAboveHoles,
    WellOpen,
    EscapeRoute,
    Bumpiness,
    MaxHeight,
    RowFillRatio,
}

impl Feature {
    pub const LEN: usize = 13;

    pub const ALL: [Self; Self::LEN] = [
        Self::LandingHeight,
        Self::LinesCleared,
        Self::PotentialLines,
        Self::RowTransitions,
        Self::ColumnTransitions,
        Self::Holes,
        Self::Wells,
        Self::BlocksAboveHoles,
        Self::WellOpen,
        Self::EscapeRoute,
        Self::Bumpiness,
        Self::MaxHeight,
        Self::RowFillRatio,
    ];

    /// The six features of the classic Dellacherie evaluator.
    pub const DELLACHERIE: [Self; 6] = [
        Self::LandingHeight,
        Self::LinesCleared,
        Self::RowTransitions,
        Self::ColumnTransitions,
        Self::Holes,
        Self::Wells,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key used for this feature in weight documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LandingHeight => "landing_height",
            Self::LinesCleared => "lines_cleared",
            Self::PotentialLines => "potential_lines",
            Self::RowTransitions => "row_transitions",
            Self::ColumnTransitions => "column_transitions",
            Self::Holes => "holes",
            Self::Wells => "wells",
            Self::BlocksAboveHoles => "blocks_above_holes",
            Self::WellOpen => "well_open",
            Self::EscapeRoute => "escape_route",
            Self::Bumpiness => "bumpiness",
            Self::MaxHeight => "max_height",
            Self::RowFillRatio => "row_fill_ratio",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn extract(self, analysis: &PlacementAnalysis) -> f32 {
        let board = analysis.board_analysis();
        match self {
            Self::LandingHeight => analysis.landing_height(),
            Self::LinesCleared => analysis.cleared_lines() as f32,
            Self::PotentialLines => board.potential_lines() as f32,
            Self::RowTransitions => board.row_transitions() as f32,
            Self::ColumnTransitions => board.column_transitions() as f32,
            Self::Holes => board.holes() as f32,
            Self::Wells => board.cumulative_wells() as f32,
            Self::BlocksAboveHoles => board.blocks_above_holes() as f32,
            Self::WellOpen => f32::from(board.well_open()),
            Self::EscapeRoute => board.escape_routes() as f32,
            Self::Bumpiness => board.bumpiness() as f32,
            Self::MaxHeight => f32::from(board.max_height()),
            Self::RowFillRatio => board.row_fill_ratio(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per [`Feature`], indexed by the feature.
///
/// Serializes as a map from feature name to value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; Feature::LEN]);

impl Default for FeatureVector {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FeatureVector {
    pub const ZERO: Self = Self([0.0; Feature::LEN]);

    /// Extracts only the features `wanted` reports as used; the rest stay 0.
    #[must_use]
    pub fn extract<F>(analysis: &PlacementAnalysis, wanted: F) -> Self
    where
        F: Fn(Feature) -> bool,
    {
        let mut values = [0.0; Feature::LEN];
        for feature in Feature::ALL {
            if wanted(feature) {
                values[feature.index()] = feature.extract(analysis);
            }
        }
        Self(values)
    }

    #[must_use]
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Feature) -> f32,
    {
        Self(Feature::ALL.map(&mut f))
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f32 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f32) {
        self.0[feature.index()] = value;
    }

    /// `Σ self[f] × other[f]`.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f32)> + '_ {
        Feature::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f32;

    fn index(&self, feature: Feature) -> &f32 {
        &self.0[feature.index()]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(Feature::LEN))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use tetrabeam_engine::{BitBoard, PieceKind, PieceRotation, Placement, find_drop_row};

    use super::*;

    #[test]
    fn test_names_match_serde() {
        for feature in Feature::ALL {
            let json = serde_json::to_string(&feature).unwrap();
            assert_eq!(json, format!("\"{}\"", feature.name()));
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("hole"), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, feature) in Feature::ALL.into_iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_extract_vertical_i_clear() {
        let board = BitBoard::from_ascii("#########.");
        let rotation = PieceRotation::new(1).unwrap();
        let row = find_drop_row(&board, PieceKind::I, rotation, 9).unwrap();
        let placement = Placement::new(PieceKind::I, rotation, 9, u8::try_from(row).unwrap());
        let analysis = PlacementAnalysis::from_board(&board, placement);
        let values = FeatureVector::extract(&analysis, |_| true);

        assert!((values[Feature::LandingHeight] - 1.5).abs() < f32::EPSILON);
        assert!((values[Feature::LinesCleared] - 1.0).abs() < f32::EPSILON);
        assert!((values[Feature::RowTransitions] - 44.0).abs() < f32::EPSILON);
        assert!((values[Feature::ColumnTransitions] - 10.0).abs() < f32::EPSILON);
        assert!(values[Feature::Holes].abs() < f32::EPSILON);
        assert!((values[Feature::Bumpiness] - 3.0).abs() < f32::EPSILON);
        assert!((values[Feature::MaxHeight] - 3.0).abs() < f32::EPSILON);
        assert!((values[Feature::RowFillRatio] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_extract_skips_unwanted() {
        let board = BitBoard::from_ascii("#########.");
        let placement = Placement::new(PieceKind::O, PieceRotation::SPAWN, 0, 19);
        let analysis = PlacementAnalysis::from_board(&board, placement);
        let values = FeatureVector::extract(&analysis, |f| f == Feature::MaxHeight);
        assert!((values[Feature::MaxHeight] - 3.0).abs() < f32::EPSILON);
        assert!(values.iter().filter(|(f, _)| *f != Feature::MaxHeight).all(|(_, v)| v.abs() < f32::EPSILON));
    }

    #[test]
    fn test_serialize_as_map() {
        let mut values = FeatureVector::ZERO;
        values.set(Feature::Holes, 2.0);
        let json = serde_json::to_value(values).unwrap();
        assert_eq!(json["holes"], 2.0);
        assert_eq!(json.as_object().unwrap().len(), Feature::LEN);
    }
}
