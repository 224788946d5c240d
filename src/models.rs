use crate::calculator::{FieldError, Standing};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type SubjectId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    pub lectures_per_week: u32,
}

impl Subject {
    pub fn new(name: impl Into<String>, lectures_per_week: u32) -> Self {
        Self {
            name: name.into(),
            lectures_per_week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    #[default]
    Weeks,
    Days,
    Months,
}

impl DurationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationMode::Weeks => "weeks",
            DurationMode::Days => "days",
            DurationMode::Months => "months",
        }
    }
}

impl fmt::Display for DurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "weeks" => Ok(DurationMode::Weeks),
            "days" => Ok(DurationMode::Days),
            "months" => Ok(DurationMode::Months),
            other => Err(format!("unknown duration mode '{other}'")),
        }
    }
}

/// Last duration entered for each mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationValues {
    pub weeks: f64,
    pub days: f64,
    pub months: f64,
}

impl Default for DurationValues {
    fn default() -> Self {
        Self {
            weeks: 16.0,
            days: 80.0,
            months: 4.0,
        }
    }
}

impl DurationValues {
    pub fn get(&self, mode: DurationMode) -> f64 {
        match mode {
            DurationMode::Weeks => self.weeks,
            DurationMode::Days => self.days,
            DurationMode::Months => self.months,
        }
    }

    pub fn with(mut self, mode: DurationMode, value: f64) -> Self {
        match mode {
            DurationMode::Weeks => self.weeks = value,
            DurationMode::Days => self.days = value,
            DurationMode::Months => self.months = value,
        }
        self
    }
}

/// Everything that is mirrored into the key-value store.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub subjects: Vec<Subject>,
    pub last_lectures_per_week: u32,
    pub calculation_mode: DurationMode,
    pub duration_values: DurationValues,
    pub attendance_criterion: String,
    pub working_days: String,
}

pub const DEFAULT_LECTURES_PER_WEEK: u32 = 4;
pub const DEFAULT_ATTENDANCE_CRITERION: &str = "75";
pub const DEFAULT_WORKING_DAYS: &str = "5";

pub fn seed_subjects() -> Vec<Subject> {
    vec![
        Subject::new("Maths", 5),
        Subject::new("Physics", 4),
        Subject::new("Chemistry", 3),
        Subject::new("Biology", 2),
    ]
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            subjects: seed_subjects(),
            last_lectures_per_week: DEFAULT_LECTURES_PER_WEEK,
            calculation_mode: DurationMode::default(),
            duration_values: DurationValues::default(),
            attendance_criterion: DEFAULT_ATTENDANCE_CRITERION.to_string(),
            working_days: DEFAULT_WORKING_DAYS.to_string(),
        }
    }
}

/// A form value that may arrive as a JSON number or as the text of an input.
/// Whole-valued floats such as `2.0` are written without the fraction so
/// they pass integer fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(serde_json::Number),
    Text(String),
}

impl RawValue {
    pub fn to_raw_string(&self) -> String {
        match self {
            RawValue::Number(number) => match number.as_f64() {
                Some(value) if number.is_f64() && value.is_finite() && value.fract() == 0.0 => {
                    format!("{value:.0}")
                }
                _ => number.to_string(),
            },
            RawValue::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSubjectRequest {
    #[serde(default)]
    pub name: String,
    pub lectures_per_week: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSubjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: DurationMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    pub attendance_criterion: Option<RawValue>,
    pub working_days: Option<RawValue>,
    pub duration: Option<RawValue>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: SubjectId,
    pub name: String,
    pub lectures_per_week: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRow {
    pub id: SubjectId,
    pub name: String,
    pub lectures_per_week: u32,
    pub total_lectures: i64,
    pub required_lectures: i64,
    pub max_bunkable: i64,
    pub weekly_skip_limit: i64,
    pub bunkable_standing: Standing,
    pub skip_limit_standing: Standing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSlice {
    pub label: String,
    pub value: u32,
    pub color: &'static str,
    pub share_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    pub total_per_week: u64,
    pub slices: Vec<ChartSlice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub attendance_criterion: String,
    pub working_days: String,
    pub mode: DurationMode,
    pub duration: f64,
    pub duration_values: DurationValues,
    pub last_lectures_per_week: u32,
    pub subjects: Vec<SubjectView>,
    pub valid: bool,
    pub rows: Vec<MetricsRow>,
    pub errors: Vec<FieldError>,
    pub chart: Option<ChartData>,
    pub notice: Option<String>,
}
