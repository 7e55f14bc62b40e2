//! # Repository Module
//!
//! Database repository implementations for Biblio.
//!
//! ## Two Entry Points Per Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Callers holding the pool                                              │
//! │       │  db.books().get_by_id(id)                                      │
//! │       ▼                                                                 │
//! │  BookRepository { pool }  ──acquire──►  book::get_by_id(conn, id)     │
//! │                                              ▲                          │
//! │  LoanEngine (inside one transaction)         │                          │
//! │       │  book::pricing_and_stock(&mut *tx, id)                          │
//! │       └──────────────────────────────────────┘                          │
//! │                                                                         │
//! │  The free functions take `&mut SqliteConnection`, so the engine can    │
//! │  chain reads and writes on one transaction and commit them together.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`book::BookRepository`] - Catalog reads and book registration
//! - [`stock::StockLedger`] - Guarded stock decrement and increment
//! - [`loan::LoanRepository`] - Loan headers and lines
//! - [`customer::CustomerRepository`] - Customers and their address
//! - [`manager::ManagerRepository`] - Staff and the administrator lookup

pub mod book;
pub mod customer;
pub mod loan;
pub mod manager;
pub mod stock;
