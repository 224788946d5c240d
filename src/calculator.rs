//! Attendance projection.
//!
//! Turns the raw configuration inputs and the ordered subject list into
//! per-subject lecture metrics. Everything here is a pure function of its
//! arguments: no I/O, no clock, no shared state.

use crate::models::{DurationMode, Subject};
use serde::Serialize;
use std::fmt;

/// Average number of weeks in a calendar month.
pub const WEEKS_PER_MONTH: f64 = 4.345;

const CRITERION_MESSAGE: &str = "Enter a valid % (e.g., 75)";
const DURATION_MESSAGE: &str = "Enter a positive number.";
const WORKING_DAYS_MESSAGE: &str = "Enter 1-7 days.";
const SUBJECT_NAME_MESSAGE: &str = "Subject name is required.";
const LECTURES_MESSAGE: &str = "Enter a positive number of lectures.";

/// Input field a validation failure is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    AttendanceCriterion,
    Duration,
    WorkingDays,
    SubjectName,
    LecturesPerWeek,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::AttendanceCriterion => "attendanceCriterion",
            Field::Duration => "duration",
            Field::WorkingDays => "workingDays",
            Field::SubjectName => "subjectName",
            Field::LecturesPerWeek => "lecturesPerWeek",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One failure per invalid field, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.0.is_empty() { Ok(value()) } else { Err(self) }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Minimum attendance, kept as the percentage the user typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    percent: f64,
}

impl Criterion {
    /// Accepts a percentage whose ratio lies in (0, 1].
    pub fn from_percent(percent: f64) -> Option<Self> {
        let ratio = percent / 100.0;
        (ratio > 0.0 && ratio <= 1.0).then_some(Self { percent })
    }

    /// `ceil(ratio * total)`, scaled so whole percentages stay exact.
    /// Capped at `total`: past 2^53 the float product can round above it.
    pub fn required_of(self, total_lectures: i64) -> i64 {
        let required = (self.percent * total_lectures as f64 / 100.0).ceil() as i64;
        required.min(total_lectures)
    }
}

/// Configuration as it sits in the session, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawConfig<'a> {
    pub attendance_criterion: &'a str,
    pub working_days: &'a str,
    pub mode: DurationMode,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidConfig {
    pub criterion: Criterion,
    pub mode: DurationMode,
    pub duration: f64,
    pub working_days: u8,
}

impl ValidConfig {
    pub fn semester_weeks(&self) -> f64 {
        semester_weeks(self.duration, self.mode, self.working_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetrics {
    pub total_lectures: i64,
    pub required_lectures: i64,
    pub max_bunkable: i64,
    pub weekly_skip_limit: i64,
}

/// Display classification of a bunk figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Safe,
    Danger,
}

impl Standing {
    pub fn of(value: i64) -> Self {
        if value >= 0 { Standing::Safe } else { Standing::Danger }
    }
}

fn strip_percent(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix('%').map(str::trim_end).unwrap_or(trimmed)
}

pub fn parse_criterion(raw: &str) -> Result<Criterion, FieldError> {
    strip_percent(raw)
        .parse::<f64>()
        .ok()
        .and_then(Criterion::from_percent)
        .ok_or_else(|| FieldError::new(Field::AttendanceCriterion, CRITERION_MESSAGE))
}

/// Parses a duration entry. Only finite numbers are accepted; the range is
/// checked separately so an out-of-range value can still be remembered.
pub fn parse_duration(raw: &str) -> Result<f64, FieldError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FieldError::new(Field::Duration, DURATION_MESSAGE))
}

pub fn check_duration(duration: f64) -> Result<f64, FieldError> {
    if duration.is_finite() && duration > 0.0 {
        Ok(duration)
    } else {
        Err(FieldError::new(Field::Duration, DURATION_MESSAGE))
    }
}

pub fn parse_working_days(raw: &str) -> Result<u8, FieldError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=7).contains(days))
        .map(|days| days as u8)
        .ok_or_else(|| FieldError::new(Field::WorkingDays, WORKING_DAYS_MESSAGE))
}

/// Validates every configuration field independently and reports all of
/// the failures together.
pub fn validate_config(raw: &RawConfig<'_>) -> Result<ValidConfig, ValidationErrors> {
    let criterion = parse_criterion(raw.attendance_criterion);
    let duration = check_duration(raw.duration);
    let working_days = parse_working_days(raw.working_days);

    match (criterion, duration, working_days) {
        (Ok(criterion), Ok(duration), Ok(working_days)) => Ok(ValidConfig {
            criterion,
            mode: raw.mode,
            duration,
            working_days,
        }),
        (criterion, duration, working_days) => Err(ValidationErrors(
            [criterion.err(), duration.err(), working_days.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

/// Validates a new subject's name and weekly lecture count.
pub fn validate_subject(name: &str, lectures_per_week: &str) -> Result<Subject, ValidationErrors> {
    let name = name.trim();
    let lectures = lectures_per_week
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count >= 1);

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::new(Field::SubjectName, SUBJECT_NAME_MESSAGE));
    }
    if lectures.is_none() {
        errors.push(FieldError::new(Field::LecturesPerWeek, LECTURES_MESSAGE));
    }

    ValidationErrors(errors).into_result(|| Subject {
        name: name.to_string(),
        lectures_per_week: lectures.unwrap_or_default(),
    })
}

pub fn validate_subject_name(name: &str) -> Result<String, FieldError> {
    let name = name.trim();
    if name.is_empty() {
        Err(FieldError::new(Field::SubjectName, SUBJECT_NAME_MESSAGE))
    } else {
        Ok(name.to_string())
    }
}

pub fn semester_weeks(duration: f64, mode: DurationMode, working_days: u8) -> f64 {
    match mode {
        DurationMode::Weeks => duration,
        DurationMode::Days => duration / f64::from(working_days),
        DurationMode::Months => duration * WEEKS_PER_MONTH,
    }
}

/// Float-to-integer conversions saturate, so an enormous term yields
/// `i64::MAX` lectures rather than wrapping.
pub fn project_subject(lectures_per_week: u32, semester_weeks: f64, criterion: Criterion) -> SubjectMetrics {
    let total_lectures = (f64::from(lectures_per_week) * semester_weeks).floor() as i64;
    let required_lectures = criterion.required_of(total_lectures);
    let max_bunkable = total_lectures - required_lectures;
    let weekly_skip_limit = if semester_weeks.is_finite() && semester_weeks > 0.0 {
        (max_bunkable as f64 / semester_weeks).floor() as i64
    } else {
        0
    };

    SubjectMetrics {
        total_lectures,
        required_lectures,
        max_bunkable,
        weekly_skip_limit,
    }
}

/// Projects every subject in order, or returns the configuration failures.
pub fn project<'a, I>(raw: &RawConfig<'_>, subjects: I) -> Result<Vec<SubjectMetrics>, ValidationErrors>
where
    I: IntoIterator<Item = &'a Subject>,
{
    let config = validate_config(raw)?;
    let weeks = config.semester_weeks();
    Ok(subjects
        .into_iter()
        .map(|subject| project_subject(subject.lectures_per_week, weeks, config.criterion))
        .collect())
}
