//! Core library for the agrilend digital lending platform.
//!
//! The crate is organized around workflow modules: `workflows::lending` owns the
//! credit decisioning pipeline (signal ingestion, 15-day forward risk forecasting,
//! credit scoring, the decision matrix, and repayment scheduling) together with the
//! repositories and HTTP router the service binary composes.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
