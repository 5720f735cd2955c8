//! HTTP API: application service, routing, and request/response mapping.

pub mod app;
