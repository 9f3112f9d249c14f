//! # catnap-db: Booking Engine and Storage for Catnap Hotel
//!
//! This crate owns the booking ledger and the catalog, and runs every
//! booking operation as one atomic unit of work on SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catnap Hotel Booking Flow                           │
//! │                                                                         │
//! │  Caller (REST handler, admin dashboard, payment webhook)               │
//! │       │  Actor { user_id, role }                                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    catnap-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ BookingEngine │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine.rs)  │    │               │    │  (embedded)  │  │   │
//! │  │   │               │───►│ CatalogRepo   │    │ 001_initial  │  │   │
//! │  │   │ unit of work  │    │ CatRepo       │    │              │  │   │
//! │  │   │ + deadline    │    │ BookingRepo   │    │              │  │   │
//! │  │   │               │    │ PaymentRepo   │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ pure rules from catnap-core                        │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite Database (WAL, one writer at a time)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - Booking orchestrator, transitions, payment confirmation
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`query`] - Typed booking query builder
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, cat, booking, payment)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catnap_db::{BookingEngine, Database, EngineConfig};
//!
//! let config = EngineConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let engine = BookingEngine::new(db).with_settings(config.settings());
//!
//! let details = engine.create_booking(&actor, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use engine::{BookingEngine, Clock, EngineSettings};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use query::BookingQuery;

// Repository re-exports for convenience
pub use repository::{BookingRepository, CatRepository, CatalogRepository, PaymentRepository};
