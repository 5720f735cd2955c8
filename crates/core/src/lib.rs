//! `catalog-core`: identifiers, input errors, the entity seam and the response
//! envelope every store-facing operation returns.
//!
//! No I/O lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod response;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use response::{Envelope, FailureKind, ResponseStatus};
