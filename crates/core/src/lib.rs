//! Domain types and pure logic for the work-planning backend.
//!
//! Nothing in this crate performs I/O. Persistence lives in `workplan-db`,
//! partner and spatial HTTP clients in `workplan-external`, and the RTU
//! import job that ties them together in `workplan-pipeline`.

pub mod audit;
pub mod geometry;
pub mod rtu;
pub mod pagination;
pub mod taxonomy;
pub mod types;
