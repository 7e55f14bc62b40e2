//! # biblio-db: Storage and Loan Engine for Biblio
//!
//! This crate owns everything that touches the database: the SQLite pool,
//! the embedded migrations, the repositories, the stock ledger and the
//! transactional loan engine built on top of them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Biblio Data Flow                                 │
//! │                                                                         │
//! │  Presentation layer (web handler, CLI, seed)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    biblio-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  LoanEngine   │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine.rs)  │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ BookRepo      │    │              │  │   │
//! │  │   │ create_loan   │───►│ StockLedger   │    │ 001_init.sql │  │   │
//! │  │   │ return_loan   │    │ LoanRepo      │    │              │  │   │
//! │  │   │ pending_fine  │    │ CustomerRepo  │    │              │  │   │
//! │  │   └───────┬───────┘    │ ManagerRepo   │    └──────────────┘  │   │
//! │  │           │            └───────┬───────┘                      │   │
//! │  │           ▼                    ▼                               │   │
//! │  │   ┌─────────────────────────────────────┐                     │   │
//! │  │   │      Database (pool.rs, SqlitePool) │                     │   │
//! │  │   └─────────────────────────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (BIBLIO_DATABASE_PATH)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven library configuration
//! - [`engine`] - Loan lifecycle: create, return, fines
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (book, stock, loan, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biblio_core::{CartLine, LoanRequest};
//! use biblio_db::{Database, LibraryConfig};
//!
//! let config = LibraryConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let engine = db.loan_engine(config.loan_policy());
//!
//! let request = LoanRequest::new(vec![CartLine::new(book_id, 2)], 14);
//! let receipt = engine.create_loan(&customer_id, &request).await?;
//! engine.return_loan(&receipt.loan_id, &customer_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, LibraryConfig};
pub use engine::LoanEngine;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::book::BookRepository;
pub use repository::customer::CustomerRepository;
pub use repository::loan::LoanRepository;
pub use repository::manager::ManagerRepository;
pub use repository::stock::StockLedger;
