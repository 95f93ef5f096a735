//! Contact management module: REST handlers, domain service, repository
//! port with its SeaORM implementation, upload storage, and the background
//! file-ingestion worker.

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === INTERNAL MODULES ===
// Exposed for the server binary and for comprehensive testing.
pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod ingest;
