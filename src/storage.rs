//! Key-value mirror of the session.
//!
//! The data file holds one JSON object whose keys are the storage keys below
//! and whose values are strings, the same shape a browser key-value store
//! would keep. Each key is read independently and falls back to its default
//! when missing or unreadable.

use crate::errors::AppError;
use crate::models::{
    DEFAULT_ATTENDANCE_CRITERION, DEFAULT_LECTURES_PER_WEEK, DEFAULT_WORKING_DAYS, DurationMode,
    DurationValues, SessionData, Subject, seed_subjects,
};
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use tracing::{debug, error, warn};

pub const SUBJECTS_KEY: &str = "subjects";
pub const LAST_LECTURES_KEY: &str = "lastLecturesPerWeek";
pub const MODE_KEY: &str = "calculationMode";
pub const DURATION_VALUES_KEY: &str = "durationValues";
pub const CRITERION_KEY: &str = "attendanceCriterion";
pub const WORKING_DAYS_KEY: &str = "workingDays";

pub type Entries = BTreeMap<String, String>;

pub fn encode(data: &SessionData) -> Result<Entries, serde_json::Error> {
    let mut entries = Entries::new();
    entries.insert(SUBJECTS_KEY.to_string(), serde_json::to_string(&data.subjects)?);
    entries.insert(LAST_LECTURES_KEY.to_string(), data.last_lectures_per_week.to_string());
    entries.insert(MODE_KEY.to_string(), data.calculation_mode.to_string());
    entries.insert(DURATION_VALUES_KEY.to_string(), serde_json::to_string(&data.duration_values)?);
    entries.insert(CRITERION_KEY.to_string(), data.attendance_criterion.clone());
    entries.insert(WORKING_DAYS_KEY.to_string(), data.working_days.clone());
    Ok(entries)
}

pub fn decode(entries: &Entries) -> SessionData {
    SessionData {
        subjects: read_key(entries, SUBJECTS_KEY, decode_subjects).unwrap_or_else(seed_subjects),
        last_lectures_per_week: read_key(entries, LAST_LECTURES_KEY, |raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|err| err.to_string())
                .and_then(|count| if count > 0 { Ok(count) } else { Err("must be positive".into()) })
        })
        .unwrap_or(DEFAULT_LECTURES_PER_WEEK),
        calculation_mode: read_key(entries, MODE_KEY, |raw| raw.parse::<DurationMode>()).unwrap_or_default(),
        duration_values: read_key(entries, DURATION_VALUES_KEY, |raw| {
            serde_json::from_str::<DurationValues>(raw).map_err(|err| err.to_string())
        })
        .unwrap_or_default(),
        attendance_criterion: read_text(entries, CRITERION_KEY, DEFAULT_ATTENDANCE_CRITERION),
        working_days: read_text(entries, WORKING_DAYS_KEY, DEFAULT_WORKING_DAYS),
    }
}

fn read_key<T, F>(entries: &Entries, key: &str, parse: F) -> Option<T>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    let raw = entries.get(key)?;
    match parse(raw.as_str()) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring stored value for '{key}': {err}");
            None
        }
    }
}

fn read_text(entries: &Entries, key: &str, default: &str) -> String {
    match entries.get(key).map(|raw| raw.trim()) {
        Some(raw) if !raw.is_empty() => raw.to_string(),
        _ => default.to_string(),
    }
}

fn decode_subjects(raw: &str) -> Result<Vec<Subject>, String> {
    let subjects: Vec<Subject> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    let total = subjects.len();
    let kept: Vec<Subject> = subjects
        .into_iter()
        .filter(|subject| !subject.name.trim().is_empty() && subject.lectures_per_week > 0)
        .collect();
    if kept.len() < total {
        warn!("dropped {} malformed stored subject(s)", total - kept.len());
    }
    Ok(kept)
}

pub async fn load_session(path: &Path) -> SessionData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Entries>(&bytes) {
            Ok(entries) => decode(&entries),
            Err(err) => {
                error!("failed to parse data file: {err}");
                SessionData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no data file at {}, starting from defaults", path.display());
            SessionData::default()
        }
        Err(err) => {
            error!("failed to read data file: {err}");
            SessionData::default()
        }
    }
}

pub async fn persist_session(path: &Path, data: &SessionData) -> Result<(), AppError> {
    let entries = encode(data).map_err(AppError::internal)?;
    let payload = serde_json::to_vec_pretty(&entries).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}
