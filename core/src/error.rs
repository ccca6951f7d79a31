//! Error types for the table API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant so callers can tell "the row does not
//! exist" apart from "the remote call failed". It is only produced by update
//! and delete in strict mode; a login without a matching row is `Ok(None)`.
//! Every other failure carries the `Operation` it happened in, so the
//! rendered message reads the same no matter which layer prints it.

use std::fmt;

use thiserror::Error;

/// The remote operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    ListData,
    AddData,
    UpdateData,
    DeleteData,
}

impl Operation {
    /// Prefix used when rendering a failure of this operation.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::ListData => "Failed to get data",
            Operation::AddData => "Failed to add data",
            Operation::UpdateData => "Failed to update data",
            Operation::DeleteData => "Failed to delete data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Register => "register",
            Operation::Login => "login",
            Operation::ListData => "list_data",
            Operation::AddData => "add_data",
            Operation::UpdateData => "update_data",
            Operation::DeleteData => "delete_data",
        };
        f.write_str(name)
    }
}

/// Errors returned by `TableClient` and the hosts that execute its requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A strict-mode update or delete matched no rows.
    #[error("record not found")]
    NotFound,

    /// The remote API answered with a non-2xx status.
    #[error("{}", remote_message(.operation, .status, .body))]
    Remote {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("{}: {message}", .operation.failure_prefix())]
    Transport { operation: Operation, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

fn remote_message(operation: &Operation, status: &u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("{} (HTTP {status})", operation.failure_prefix())
    } else {
        format!("{}: {body}", operation.failure_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_carries_body() {
        let err = ApiError::Remote {
            operation: Operation::Register,
            status: 409,
            body: r#"{"code":"23505"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"Registration failed: {"code":"23505"}"#);
    }

    #[test]
    fn remote_error_without_body_is_generic() {
        let err = ApiError::Remote {
            operation: Operation::ListData,
            status: 503,
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to get data (HTTP 503)");
    }

    #[test]
    fn transport_error_uses_operation_prefix() {
        let err = ApiError::Transport {
            operation: Operation::DeleteData,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to delete data: connection refused");
    }
}
