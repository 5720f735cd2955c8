//! Uniform success/failure response envelope.
//!
//! Every store-facing operation returns an [`Envelope`]; callers never receive a
//! naked value or a raw error. The envelope is a tagged variant, so "result
//! present" and "error message present" can never both hold (or both be absent),
//! and `is_successful()` is derived from the variant rather than stored.
//!
//! On the wire it keeps the flat shape clients expect:
//!
//! ```json
//! { "isSuccessful": true, "result": ..., "message": "...", "errorMessage": "", "statusCode": 200 }
//! ```

use serde::{Serialize, Serializer};

/// Message attached to every success envelope.
pub const SUCCESS_MESSAGE: &str = "The process was completed successfully.";

/// Status classification carried by an envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ResponseStatus {
    /// HTTP-style numeric code.
    pub fn as_u16(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::BadRequest => 400,
            ResponseStatus::NotFound => 404,
            ResponseStatus::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::BadRequest => "Bad Request",
            ResponseStatus::NotFound => "Not Found",
            ResponseStatus::InternalServerError => "Internal Server Error",
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

/// Why an operation failed.
///
/// There is deliberately no `Ok` member: a failure envelope cannot claim success.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required input was missing or empty.
    InvalidInput,
    /// The identifier has no matching record.
    NotFound,
    /// The store raised an error, or a commit affected no rows.
    PersistenceFailure,
}

impl FailureKind {
    pub fn status(self) -> ResponseStatus {
        match self {
            FailureKind::InvalidInput => ResponseStatus::BadRequest,
            FailureKind::NotFound => ResponseStatus::NotFound,
            FailureKind::PersistenceFailure => ResponseStatus::InternalServerError,
        }
    }
}

/// Result wrapper returned by every repository operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Success { result: T, message: String },
    Failure { kind: FailureKind, error_message: String },
}

impl<T> Envelope<T> {
    pub fn success(result: T) -> Self {
        Envelope::Success {
            result,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(error_message: impl Into<String>, kind: FailureKind) -> Self {
        Envelope::Failure {
            kind,
            error_message: error_message.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn status_code(&self) -> ResponseStatus {
        match self {
            Envelope::Success { .. } => ResponseStatus::Ok,
            Envelope::Failure { kind, .. } => kind.status(),
        }
    }

    /// Failure classification, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Envelope::Success { result, .. } => Some(result),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<T> {
        match self {
            Envelope::Success { result, .. } => Some(result),
            Envelope::Failure { .. } => None,
        }
    }

    /// Human-readable text; for failures this is the status reason phrase.
    pub fn message(&self) -> &str {
        match self {
            Envelope::Success { message, .. } => message,
            Envelope::Failure { kind, .. } => kind.status().reason(),
        }
    }

    /// Empty for successes.
    pub fn error_message(&self) -> &str {
        match self {
            Envelope::Success { .. } => "",
            Envelope::Failure { error_message, .. } => error_message,
        }
    }

    /// Reshape a success payload, passing failures through untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success { result, message } => Envelope::Success {
                result: f(result),
                message,
            },
            Envelope::Failure {
                kind,
                error_message,
            } => Envelope::Failure {
                kind,
                error_message,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope<'a, T> {
    is_successful: bool,
    result: Option<&'a T>,
    message: &'a str,
    error_message: &'a str,
    status_code: ResponseStatus,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEnvelope {
            is_successful: self.is_successful(),
            result: self.result(),
            message: self.message(),
            error_message: self.error_message(),
            status_code: self.status_code(),
        }
        .serialize(serializer)
    }
}
