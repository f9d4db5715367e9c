//! Scheduled RTU synchronization.

pub mod config;
pub mod scheduler;
