//! Fixtures shared by the unit tests of this crate.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use biblio_core::{Book, Customer, Manager};

use crate::pool::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// A database file under the temp dir with a real multi-connection pool.
pub async fn file_db(max_connections: u32) -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!("biblio-{}.db", Uuid::new_v4().simple()));
    let config = DbConfig::new(&path)
        .max_connections(max_connections)
        .busy_timeout(Duration::from_secs(30));
    let db = Database::new(config).await.expect("file database");
    (db, path)
}

/// Closes the pool and removes the database file with its WAL companions.
pub async fn remove_file_db(db: Database, path: &Path) {
    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub fn new_customer(email: &str) -> Customer {
    Customer {
        id: Uuid::new_v4().to_string(),
        name: "Test Customer".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        phone: None,
        created_at: Utc::now(),
    }
}

pub async fn seed_customer(db: &Database, email: &str) -> Customer {
    db.customers()
        .insert(&new_customer(email))
        .await
        .expect("insert customer")
}

pub async fn seed_manager(db: &Database, email: &str) -> Manager {
    let manager = Manager {
        id: Uuid::new_v4().to_string(),
        code: None,
        name: "Test Manager".to_string(),
        phone: None,
        email: email.to_string(),
        password_hash: "hash".to_string(),
    };
    db.managers().insert(&manager).await.expect("insert manager")
}

pub fn new_book(manager_id: &str, title: &str, price_cents: i64, stock: i64) -> Book {
    let now = Utc::now();
    Book {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        isbn: None,
        year: None,
        author_id: None,
        publisher_id: None,
        genre_id: None,
        country_of_origin: None,
        stock,
        price_cents,
        manager_id: manager_id.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Inserts a book owned by a fresh manager.
pub async fn seed_book(db: &Database, title: &str, price_cents: i64, stock: i64) -> Book {
    let manager = seed_manager(db, &format!("{}@biblio.local", Uuid::new_v4().simple())).await;
    db.books()
        .insert(&new_book(&manager.id, title, price_cents, stock))
        .await
        .expect("insert book")
}
