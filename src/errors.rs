use crate::calculator::{FieldError, ValidationErrors};
use crate::session::SessionError;
use axum::{Json, http::StatusCode};
use serde::Serialize;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
struct ValidationBody<'a> {
    message: &'a str,
    errors: &'a [FieldError],
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "invalid input".to_string(),
            fields: errors.0,
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(errors) => Self::invalid(errors),
            SessionError::UnknownSubject(_) => Self::not_found(err.to_string()),
            SessionError::ClearNotConfirmed => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.fields.is_empty() {
            return (self.status, self.message).into_response();
        }
        let body = ValidationBody {
            message: &self.message,
            errors: &self.fields,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Field;

    #[test]
    fn session_errors_map_to_statuses() {
        let invalid = AppError::from(SessionError::Invalid(ValidationErrors::single(FieldError::new(
            Field::SubjectName,
            "Subject name is required.",
        ))));
        assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.fields.len(), 1);

        let missing = AppError::from(SessionError::UnknownSubject(7));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "no subject with id 7");

        let unconfirmed = AppError::from(SessionError::ClearNotConfirmed);
        assert_eq!(unconfirmed.status, StatusCode::BAD_REQUEST);
    }
}
