// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// A collection fetch that produced no usable records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cannot reach server: {0}")]
    Unreachable(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A draft rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A create, update, delete or status change the backend did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("cannot reach server: {0}")]
    Unreachable(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Any failure the user is told about in a notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("save failed: {0}")]
    Mutation(#[from] MutationError),
}

impl PortalError {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Load(_) => "Load failed",
            Self::Validation(_) => "Check the form",
            Self::Mutation(_) => "Not saved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadError, MutationError, PortalError, ValidationError};

    #[test]
    fn messages_read_as_sentences() {
        let missing = PortalError::from(ValidationError::Missing { field: "name" });
        assert_eq!(missing.to_string(), "invalid input: name is required");
        assert_eq!(missing.title(), "Check the form");

        let status = LoadError::Status {
            status: 503,
            message: "maintenance".to_owned(),
        };
        assert_eq!(status.to_string(), "server returned 503: maintenance");

        let rejected = MutationError::Rejected {
            status: 400,
            message: "duplicate email".to_owned(),
        };
        assert_eq!(
            PortalError::from(rejected).to_string(),
            "save failed: duplicate email"
        );
    }
}
