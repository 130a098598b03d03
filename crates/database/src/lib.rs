//! # Pulse Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL observation store. It is the system's "permanent archive."
//!
//! ## Architectural Principles
//!
//! - **Append-only:** Observations are written once and never updated or
//!   deleted; corrections are new observations, and retention is an
//!   operational policy outside the application.
//! - **Adapter:** This crate encapsulates all database-specific logic behind
//!   a small API, hiding SQL and driver details from the rest of the system.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a
//!   shared connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations.
//! - `ObservationRepository`: The main struct holding the pool and providing
//!   the append and range-query methods.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbObservation, ObservationRepository};
