//! The single in-memory session.
//!
//! A `Session` is never edited in place by callers: every transition
//! borrows the current value and hands back its replacement, leaving the
//! original untouched when the transition is rejected.

use crate::calculator::{
    self, RawConfig, SubjectMetrics, ValidationErrors, parse_duration, validate_subject,
    validate_subject_name,
};
use crate::models::{DurationMode, DurationValues, SessionData, Subject, SubjectId};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("no subject with id {0}")]
    UnknownSubject(SubjectId),

    #[error("clearing all subjects must be confirmed")]
    ClearNotConfirmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: SubjectId,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    entries: Vec<Entry>,
    next_id: SubjectId,
    last_lectures_per_week: u32,
    mode: DurationMode,
    duration_values: DurationValues,
    attendance_criterion: String,
    working_days: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_data(SessionData::default())
    }
}

impl Session {
    /// Ids are handed out in stored order, starting at 1.
    pub fn from_data(data: SessionData) -> Self {
        let entries: Vec<Entry> = data
            .subjects
            .into_iter()
            .zip(1..)
            .map(|(subject, id)| Entry { id, subject })
            .collect();
        let next_id = entries.len() as SubjectId + 1;

        Self {
            entries,
            next_id,
            last_lectures_per_week: data.last_lectures_per_week,
            mode: data.calculation_mode,
            duration_values: data.duration_values,
            attendance_criterion: data.attendance_criterion,
            working_days: data.working_days,
        }
    }

    pub fn to_data(&self) -> SessionData {
        SessionData {
            subjects: self.entries.iter().map(|entry| entry.subject.clone()).collect(),
            last_lectures_per_week: self.last_lectures_per_week,
            calculation_mode: self.mode,
            duration_values: self.duration_values,
            attendance_criterion: self.attendance_criterion.clone(),
            working_days: self.working_days.clone(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.entries.iter().map(|entry| &entry.subject)
    }

    pub fn position(&self, id: SubjectId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn last_lectures_per_week(&self) -> u32 {
        self.last_lectures_per_week
    }

    pub fn mode(&self) -> DurationMode {
        self.mode
    }

    pub fn duration_values(&self) -> DurationValues {
        self.duration_values
    }

    /// Duration shown for the active mode.
    pub fn duration(&self) -> f64 {
        self.duration_values.get(self.mode)
    }

    pub fn attendance_criterion(&self) -> &str {
        &self.attendance_criterion
    }

    pub fn working_days(&self) -> &str {
        &self.working_days
    }

    pub fn raw_config(&self) -> RawConfig<'_> {
        RawConfig {
            attendance_criterion: &self.attendance_criterion,
            working_days: &self.working_days,
            mode: self.mode,
            duration: self.duration(),
        }
    }

    pub fn projection(&self) -> Result<Vec<SubjectMetrics>, ValidationErrors> {
        calculator::project(&self.raw_config(), self.subjects())
    }

    pub fn add_subject(&self, name: &str, lectures_per_week: &str) -> Result<Session, SessionError> {
        let subject = validate_subject(name, lectures_per_week)?;
        let mut next = self.clone();
        next.last_lectures_per_week = subject.lectures_per_week;
        next.entries.push(Entry {
            id: next.next_id,
            subject,
        });
        next.next_id += 1;
        Ok(next)
    }

    /// Rejects an empty name; the current name stays as it was.
    pub fn rename_subject(&self, id: SubjectId, name: &str) -> Result<Session, SessionError> {
        let index = self.position(id).ok_or(SessionError::UnknownSubject(id))?;
        let name = validate_subject_name(name).map_err(ValidationErrors::single)?;
        let mut next = self.clone();
        next.entries[index].subject.name = name;
        Ok(next)
    }

    pub fn remove_subject(&self, id: SubjectId) -> Result<Session, SessionError> {
        let index = self.position(id).ok_or(SessionError::UnknownSubject(id))?;
        let mut next = self.clone();
        next.entries.remove(index);
        Ok(next)
    }

    pub fn clear_subjects(&self, confirmed: bool) -> Result<Session, SessionError> {
        if !confirmed {
            return Err(SessionError::ClearNotConfirmed);
        }
        let mut next = self.clone();
        next.entries.clear();
        Ok(next)
    }

    pub fn switch_mode(&self, mode: DurationMode) -> Session {
        Session {
            mode,
            ..self.clone()
        }
    }

    /// Stores the duration for the active mode only. Text that is not a
    /// number is rejected and the stored value kept.
    pub fn set_duration(&self, raw: &str) -> Result<Session, SessionError> {
        let value = parse_duration(raw).map_err(ValidationErrors::single)?;
        Ok(Session {
            duration_values: self.duration_values.with(self.mode, value),
            ..self.clone()
        })
    }

    pub fn set_attendance_criterion(&self, raw: &str) -> Session {
        Session {
            attendance_criterion: raw.trim().to_string(),
            ..self.clone()
        }
    }

    pub fn set_working_days(&self, raw: &str) -> Session {
        Session {
            working_days: raw.trim().to_string(),
            ..self.clone()
        }
    }
}
