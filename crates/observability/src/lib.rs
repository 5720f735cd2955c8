//! Process-wide logging setup for the catalog binaries.

/// Install the global subscriber using the format chosen by `CATALOG_LOG_FORMAT`.
///
/// Later calls leave the first subscriber in place.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

pub mod tracing;
