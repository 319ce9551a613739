//! The versioned weight configuration document.
//!
//! A [`WeightConfiguration`] holds everything the evaluator is tuned with:
//! per-phase coefficients, phase thresholds, situational multiplier tables,
//! profile tables and pattern bonuses, plus descriptive metadata.
//!
//! # Loading
//!
//! Loading is strict and happens in three steps:
//!
//! 1. The document is parsed into a raw [`serde_json::Value`].
//! 2. `schema_version` is checked; a missing or unknown version is rejected
//!    without looking at the rest of the document.
//! 3. The raw value is validated as a whole ([`validate_document`]). Every
//!    problem found is collected with its JSON path, and any problem rejects
//!    the document. Only a clean document is decoded into the typed model.
//!
//! Falling back when a document is rejected is the job of
//! [`WeightStore`](crate::store::WeightStore), not of the loader.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{ValidationIssue, WeightConfigError},
    feature::{Feature, FeatureVector},
    situation::{BoardMetric, Condition, Situation, SituationKind, Situations, Trigger, TriggerMode},
    weights::{CoefficientTable, EvaluationWeights, GamePhase, PhaseThresholds, PhaseWeights},
};

/// The only schema version this crate reads and writes.
pub const CURRENT_SCHEMA_VERSION: u64 = 1;

/// Per-profile multiplier tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTables {
    pub stacking: CoefficientTable,
}

/// Score bonuses for recognized structures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternBonuses {
    pub perfect_clear_opener: f32,
    pub dt_cannon: f32,
    pub st_stack: f32,
    pub perfect_clear: f32,
    /// Multiplies a setup's bonus when the piece it waits for is in the preview.
    pub queue_support_factor: f32,
}

impl PatternBonuses {
    const KEYS: [&'static str; 5] = [
        "perfect_clear_opener",
        "dt_cannon",
        "st_stack",
        "perfect_clear",
        "queue_support_factor",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfiguration {
    pub schema_version: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub phase_thresholds: PhaseThresholds,
    pub phases: PhaseWeights,
    pub situations: Situations,
    pub profiles: ProfileTables,
    pub patterns: PatternBonuses,
}

impl Default for WeightConfiguration {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WeightConfiguration {
    /// The weight set compiled into the crate, used when no document loads.
    #[must_use]
    pub fn builtin() -> Self {
        #[rustfmt::skip]
        let [early, mid, late] = [
            [-4.5, 3.0, 0.5, -3.2, -9.3, -7.9, -3.4, -1.0, 0.5, 0.5, -0.5, -0.5, 1.0],
            [-4.5, 3.4, 0.8, -3.2, -9.3, -7.9, -3.4, -1.5, 0.8, 0.8, -0.6, -1.0, 1.0],
            [-5.0, 4.5, 1.0, -3.4, -9.3, -8.5, -3.0, -2.0, 0.4, 1.2, -0.8, -2.0, 0.8],
        ]
        .map(weights_from_row);

        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            name: "default".to_owned(),
            description: "Built-in Dellacherie-derived weights with phase and situation tuning"
                .to_owned(),
            created_at: DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default(),
            phase_thresholds: PhaseThresholds::default(),
            phases: PhaseWeights { early, mid, late },
            situations: Situations {
                danger_zone: Situation {
                    trigger: Trigger {
                        mode: TriggerMode::All,
                        conditions: vec![Condition::at_least(BoardMetric::MaxHeight, 15.0)],
                    },
                    multipliers: CoefficientTable::new()
                        .with(Feature::MaxHeight, 3.0)
                        .with(Feature::LandingHeight, 1.5)
                        .with(Feature::LinesCleared, 2.0)
                        .with(Feature::WellOpen, 0.0),
                },
                survival: Situation {
                    trigger: Trigger {
                        mode: TriggerMode::Any,
                        conditions: vec![
                            Condition::at_least(BoardMetric::MaxHeight, 10.0),
                            Condition::at_least(BoardMetric::Holes, 6.0),
                        ],
                    },
                    multipliers: CoefficientTable::new()
                        .with(Feature::Holes, 1.3)
                        .with(Feature::LinesCleared, 1.5)
                        .with(Feature::EscapeRoute, 0.5),
                },
                cleanup: Situation {
                    trigger: Trigger {
                        mode: TriggerMode::All,
                        conditions: vec![
                            Condition::at_most(BoardMetric::MaxHeight, 4.0),
                            Condition::at_most(BoardMetric::OccupiedCells, 16.0),
                            Condition::at_least(BoardMetric::OccupiedCells, 1.0),
                        ],
                    },
                    multipliers: CoefficientTable::new()
                        .with(Feature::LinesCleared, 1.5)
                        .with(Feature::Holes, 1.2)
                        .with(Feature::RowFillRatio, 1.5),
                },
            },
            profiles: ProfileTables {
                stacking: CoefficientTable::new()
                    .with(Feature::LinesCleared, 0.5)
                    .with(Feature::WellOpen, 2.0)
                    .with(Feature::Bumpiness, 1.5),
            },
            patterns: PatternBonuses {
                perfect_clear_opener: 4.0,
                dt_cannon: 3.0,
                st_stack: 2.0,
                perfect_clear: 50.0,
                queue_support_factor: 1.5,
            },
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, WeightConfigError> {
        let value = serde_json::from_str(json).map_err(WeightConfigError::Parse)?;
        Self::from_value(value)
    }

    pub fn from_path(path: &Path) -> Result<Self, WeightConfigError> {
        let json = fs::read_to_string(path).map_err(|source| WeightConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_value(value: Value) -> Result<Self, WeightConfigError> {
        check_document(&value)?;
        serde_json::from_value(value).map_err(WeightConfigError::Parse)
    }

    #[must_use]
    pub fn phase_for(&self, lines: u32, level: u32) -> GamePhase {
        self.phase_thresholds.phase_for(lines, level)
    }

    #[must_use]
    pub fn phase_weights(&self, phase: GamePhase) -> &EvaluationWeights {
        self.phases.get(phase)
    }
}

fn weights_from_row(row: [f32; Feature::LEN]) -> EvaluationWeights {
    EvaluationWeights::from_vector(&FeatureVector::from_fn(|feature| row[feature.index()]))
}

/// Version check followed by full validation.
pub fn check_document(value: &Value) -> Result<(), WeightConfigError> {
    check_schema_version(value)?;
    let issues = validate_document(value);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(WeightConfigError::Invalid(issues))
    }
}

fn check_schema_version(value: &Value) -> Result<(), WeightConfigError> {
    let Some(root) = value.as_object() else {
        return Err(WeightConfigError::Invalid(vec![ValidationIssue::new(
            "$",
            "expected an object",
        )]));
    };
    let version = root
        .get("schema_version")
        .ok_or(WeightConfigError::MissingSchemaVersion)?;
    let Some(found) = version.as_u64() else {
        return Err(WeightConfigError::Invalid(vec![ValidationIssue::new(
            "schema_version",
            "expected a non-negative integer",
        )]));
    };
    if found != CURRENT_SCHEMA_VERSION {
        return Err(WeightConfigError::UnsupportedSchemaVersion { found });
    }
    Ok(())
}

/// Collects every structural problem in a raw weight document.
///
/// An empty result means the document decodes into [`WeightConfiguration`].
#[must_use]
pub fn validate_document(value: &Value) -> Vec<ValidationIssue> {
    let mut v = Validator::default();
    let Some(root) = v.object(value, "$") else {
        return v.issues;
    };

    if let Some(version) = v.field(root, "", "schema_version") {
        match version.as_u64() {
            Some(CURRENT_SCHEMA_VERSION) => {}
            Some(found) => v.issue("schema_version", format!("unsupported version {found}")),
            None => v.issue("schema_version", "expected a non-negative integer"),
        }
    }
    if let Some(name) = v.field(root, "", "name") {
        v.string(name, "name");
    }
    if let Some(description) = root.get("description") {
        v.string(description, "description");
    }
    if let Some(created_at) = v.field_str(root, "", "created_at") {
        if DateTime::parse_from_rfc3339(created_at).is_err() {
            v.issue("created_at", "expected an RFC 3339 timestamp");
        }
    }

    if let Some(thresholds) = v.field_object(root, "", "phase_thresholds") {
        for key in ["mid_lines", "late_lines", "mid_level", "late_level"] {
            let Some(value) = v.field(thresholds, "phase_thresholds", key) else {
                continue;
            };
            if value.as_u64().is_none_or(|n| u32::try_from(n).is_err()) {
                v.issue(join("phase_thresholds", key), "expected a non-negative integer");
            }
        }
    }

    if let Some(phases) = v.field_object(root, "", "phases") {
        v.unknown_keys(phases, "phases", &GamePhase::ALL.map(GamePhase::name));
        for phase in GamePhase::ALL {
            if let Some(weights) = v.field(phases, "phases", phase.name()) {
                v.coefficients(weights, &join("phases", phase.name()), true);
            }
        }
    }

    if let Some(situations) = v.field_object(root, "", "situations") {
        v.unknown_keys(situations, "situations", &SituationKind::ALL.map(SituationKind::name));
        for kind in SituationKind::ALL {
            if let Some(situation) = v.field(situations, "situations", kind.name()) {
                v.situation(situation, &join("situations", kind.name()));
            }
        }
    }

    if let Some(profiles) = v.field_object(root, "", "profiles") {
        v.unknown_keys(profiles, "profiles", &["stacking"]);
        if let Some(stacking) = v.field(profiles, "profiles", "stacking") {
            v.coefficients(stacking, "profiles.stacking", false);
        }
    }

    if let Some(patterns) = v.field_object(root, "", "patterns") {
        v.unknown_keys(patterns, "patterns", &PatternBonuses::KEYS);
        for key in PatternBonuses::KEYS {
            if let Some(value) = v.field(patterns, "patterns", key) {
                v.number(value, &join("patterns", key));
            }
        }
    }

    v.issues
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

#[derive(Debug, Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.issue(path, "expected an object");
        }
        object
    }

    fn field<'a>(&mut self, object: &'a Map<String, Value>, parent: &str, key: &str) -> Option<&'a Value> {
        let value = object.get(key);
        if value.is_none() {
            self.issue(join(parent, key), "missing");
        }
        value
    }

    fn field_object<'a>(
        &mut self,
        object: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Map<String, Value>> {
        let value = self.field(object, parent, key)?;
        self.object(value, &join(parent, key))
    }

    fn field_str<'a>(&mut self, object: &'a Map<String, Value>, parent: &str, key: &str) -> Option<&'a str> {
        let value = self.field(object, parent, key)?;
        self.string(value, &join(parent, key))
    }

    fn string<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a str> {
        let text = value.as_str();
        if text.is_none() {
            self.issue(path, "expected a string");
        }
        text
    }

    #[expect(clippy::cast_possible_truncation)]
    fn number(&mut self, value: &Value, path: &str) -> Option<f32> {
        let Some(number) = value.as_f64() else {
            self.issue(path, "expected a number");
            return None;
        };
        let number = number as f32;
        if !number.is_finite() {
            self.issue(path, "number is out of range");
            return None;
        }
        Some(number)
    }

    fn unknown_keys(&mut self, object: &Map<String, Value>, path: &str, allowed: &[&str]) {
        for key in object.keys() {
            if !allowed.contains(&key.as_str()) {
                self.issue(join(path, key), "unknown key");
            }
        }
    }

    /// A feature-name to number map; `complete` requires every feature.
    fn coefficients(&mut self, value: &Value, path: &str, complete: bool) {
        let Some(table) = self.object(value, path) else {
            return;
        };
        for (key, value) in table {
            if Feature::from_name(key).is_none() {
                self.issue(join(path, key), "unknown feature");
                continue;
            }
            self.number(value, &join(path, key));
        }
        if complete {
            for feature in Feature::ALL {
                if !table.contains_key(feature.name()) {
                    self.issue(join(path, feature.name()), "missing");
                }
            }
        }
    }

    fn situation(&mut self, value: &Value, path: &str) {
        let Some(situation) = self.object(value, path) else {
            return;
        };
        self.unknown_keys(situation, path, &["trigger", "multipliers"]);
        if let Some(multipliers) = self.field(situation, path, "multipliers") {
            self.coefficients(multipliers, &join(path, "multipliers"), false);
        }
        let trigger_path = join(path, "trigger");
        let Some(trigger) = self.field(situation, path, "trigger") else {
            return;
        };
        let Some(trigger) = self.object(trigger, &trigger_path) else {
            return;
        };
        if let Some(mode) = self.field_str(trigger, &trigger_path, "mode") {
            if !matches!(mode, "all" | "any") {
                self.issue(
                    join(&trigger_path, "mode"),
                    format!("unknown mode {mode:?} (expected \"all\" or \"any\")"),
                );
            }
        }
        let conditions_path = join(&trigger_path, "conditions");
        let Some(conditions) = self.field(trigger, &trigger_path, "conditions") else {
            return;
        };
        let Some(conditions) = conditions.as_array() else {
            self.issue(conditions_path, "expected an array");
            return;
        };
        for (i, condition) in conditions.iter().enumerate() {
            self.condition(condition, &format!("{conditions_path}[{i}]"));
        }
    }

    fn condition(&mut self, value: &Value, path: &str) {
        let Some(condition) = self.object(value, path) else {
            return;
        };
        self.unknown_keys(condition, path, &["metric", "at_least", "at_most"]);
        if let Some(metric) = self.field_str(condition, path, "metric") {
            if !BoardMetric::NAMES.contains(&metric) {
                self.issue(join(path, "metric"), format!("unknown metric {metric:?}"));
            }
        }
        let mut bounded = false;
        for key in ["at_least", "at_most"] {
            if let Some(bound) = condition.get(key) {
                bounded = true;
                self.number(bound, &join(path, key));
            }
        }
        if !bounded {
            self.issue(path, "condition needs at_least or at_most");
        }
    }
}
