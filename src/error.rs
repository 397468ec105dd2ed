//! The single error type surfaced for any invalid definition.

use thiserror::Error;

/// Broad class of a validation failure.
///
/// Every [`ValidationError`] variant belongs to exactly one class:
/// shape (a value does not match its declared structure), reference
/// (a state name does not resolve), or constraint (a field combination
/// violates an ASL rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Shape,
    Reference,
    Constraint,
}

/// Validation failure for a state-machine definition.
///
/// Construction either fully succeeds or fails with this type; no other
/// error kind is part of the contract. Each variant carries the dotted
/// path of the offending field (`States.X.Branches[2].StartAt`), so a
/// nested failure is diagnosable without re-parsing the input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The document does not deserialize into the schema: missing
    /// required field, wrong container kind, unknown field, or an
    /// unrecognized `Type` discriminator.
    #[error("malformed definition: {message}")]
    Malformed { message: String },

    #[error("{path}: at least one state is required")]
    EmptyStates { path: String },

    #[error("{path}: invalid state name {name:?} (must be 1-128 characters)")]
    InvalidStateName { path: String, name: String },

    #[error("{path}: missing required field {field:?}")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: {message}")]
    InvalidField { path: String, message: String },

    #[error("{path}: {field:?} requires at least one item")]
    EmptyField { path: String, field: &'static str },

    #[error("{path}: {value:?} is not a JSONPath (must start with \"$.\")")]
    InvalidJsonPath { path: String, value: String },

    #[error("{path}: {value:?} is not an ISO-8601 date-time: {message}")]
    InvalidTimestamp {
        path: String,
        value: String,
        message: String,
    },

    #[error("{path}: reference to unknown state name {name:?}")]
    UnknownState { path: String, name: String },

    #[error("{path}: state {name:?} is unreachable")]
    UnreachableState { path: String, name: String },

    #[error("{path}: only one of {fields} may be set")]
    ExclusiveFields { path: String, fields: String },

    #[error("{path}: exactly one of {fields} must be set")]
    RequiredOneOf { path: String, fields: String },

    #[error("{path}: either \"Next\" or \"End\" is required")]
    MissingTransition { path: String },

    #[error("{path}: HeartbeatSeconds ({heartbeat}) cannot be greater than TimeoutSeconds ({timeout})")]
    HeartbeatExceedsTimeout {
        path: String,
        heartbeat: u64,
        timeout: u64,
    },
}

impl ValidationError {
    /// Class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. }
            | Self::EmptyStates { .. }
            | Self::InvalidStateName { .. }
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::EmptyField { .. }
            | Self::InvalidJsonPath { .. }
            | Self::InvalidTimestamp { .. } => ErrorKind::Shape,
            Self::UnknownState { .. } | Self::UnreachableState { .. } => ErrorKind::Reference,
            Self::ExclusiveFields { .. }
            | Self::RequiredOneOf { .. }
            | Self::MissingTransition { .. }
            | Self::HeartbeatExceedsTimeout { .. } => ErrorKind::Constraint,
        }
    }

    /// Stable diagnostic code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "E001",
            Self::EmptyStates { .. } => "E002",
            Self::InvalidStateName { .. } => "E003",
            Self::MissingField { .. } => "E004",
            Self::InvalidField { .. } => "E005",
            Self::EmptyField { .. } => "E006",
            Self::InvalidJsonPath { .. } => "E007",
            Self::InvalidTimestamp { .. } => "E008",
            Self::ExclusiveFields { .. } => "E009",
            Self::RequiredOneOf { .. } => "E010",
            Self::MissingTransition { .. } => "E011",
            Self::HeartbeatExceedsTimeout { .. } => "E012",
            Self::UnknownState { .. } => "E101",
            Self::UnreachableState { .. } => "E102",
        }
    }

    /// Dotted path of the offending field, when one is known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Malformed { .. } => None,
            Self::EmptyStates { path }
            | Self::InvalidStateName { path, .. }
            | Self::MissingField { path, .. }
            | Self::InvalidField { path, .. }
            | Self::EmptyField { path, .. }
            | Self::InvalidJsonPath { path, .. }
            | Self::InvalidTimestamp { path, .. }
            | Self::UnknownState { path, .. }
            | Self::UnreachableState { path, .. }
            | Self::ExclusiveFields { path, .. }
            | Self::RequiredOneOf { path, .. }
            | Self::MissingTransition { path }
            | Self::HeartbeatExceedsTimeout { path, .. } => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ValidationError::Malformed {
                message: "x".into()
            }
            .to_string(),
            "malformed definition: x"
        );
        assert_eq!(
            ValidationError::EmptyStates {
                path: "States".into()
            }
            .to_string(),
            "States: at least one state is required"
        );
        assert_eq!(
            ValidationError::UnknownState {
                path: "StartAt".into(),
                name: "Foo".into()
            }
            .to_string(),
            "StartAt: reference to unknown state name \"Foo\""
        );
        assert_eq!(
            ValidationError::MissingTransition {
                path: "States.A".into()
            }
            .to_string(),
            "States.A: either \"Next\" or \"End\" is required"
        );
        assert_eq!(
            ValidationError::HeartbeatExceedsTimeout {
                path: "States.T".into(),
                heartbeat: 90,
                timeout: 60
            }
            .to_string(),
            "States.T: HeartbeatSeconds (90) cannot be greater than TimeoutSeconds (60)"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ValidationError::Malformed {
                message: String::new()
            }
            .kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            ValidationError::UnknownState {
                path: String::new(),
                name: String::new()
            }
            .kind(),
            ErrorKind::Reference
        );
        assert_eq!(
            ValidationError::UnreachableState {
                path: String::new(),
                name: String::new()
            }
            .kind(),
            ErrorKind::Reference
        );
        assert_eq!(
            ValidationError::ExclusiveFields {
                path: String::new(),
                fields: String::new()
            }
            .kind(),
            ErrorKind::Constraint
        );
    }

    #[test]
    fn test_error_codes_and_paths() {
        let err = ValidationError::UnknownState {
            path: "States.A.Next".into(),
            name: "B".into(),
        };
        assert_eq!(err.code(), "E101");
        assert_eq!(err.path(), Some("States.A.Next"));

        let err = ValidationError::Malformed {
            message: "bad".into(),
        };
        assert_eq!(err.code(), "E001");
        assert_eq!(err.path(), None);
    }
}
