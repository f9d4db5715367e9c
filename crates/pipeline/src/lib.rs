//! RTU import pipeline.
//!
//! Mirrors the partner registry's work declarations into local storage:
//!
//! ```text
//! ImportOrchestrator
//!   -> SessionClient::open
//!   -> reference data (taxonomies, AreaResolver)
//!   -> ProjectFetcher      (filter batches, session refresh)
//!   -> ProjectMapper       (validation, area resolution, geometry merge)
//!   -> ImportCommitter     (delete all, insert valid)
//!   -> ImportLogRecorder   (one log per run)
//! ```
//!
//! Every collaborator is reached through a trait in [`ports`], so the whole
//! pipeline runs against in-memory fakes in tests and against
//! PostgreSQL/HTTP through [`adapters`] in production.

pub mod adapters;
pub mod area_resolver;
pub mod committer;
pub mod fetcher;
pub mod mapper;
pub mod merger;
pub mod orchestrator;
pub mod ports;
pub mod recorder;
pub mod session;
pub mod settings;

pub use orchestrator::{ImportOrchestrator, ImportPorts, ImportRun};
pub use settings::ImportSettings;
