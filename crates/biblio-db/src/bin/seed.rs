//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development and runs one
//! loan round trip against it.
//!
//! ## Usage
//! ```bash
//! # Generate 200 books (default)
//! cargo run -p biblio-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p biblio-db --bin seed -- --count 1000
//!
//! # Specify database path (otherwise BIBLIO_DATABASE_PATH or ./biblio.db)
//! cargo run -p biblio-db --bin seed -- --db ./data/biblio.db
//! ```
//!
//! ## Generated Data
//! - The administrator manager (`BIBLIO_ADMIN_EMAIL`)
//! - A handful of authors, publishers and genres
//! - N books with deterministic price (R$9.90 - R$89.90) and stock (0 - 12)
//! - One demo customer with an address
//!
//! Then a two-book loan is created and returned, and both receipts are
//! printed as JSON.

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use biblio_core::{Address, Book, CartLine, Customer, LoanRequest, Manager};
use biblio_db::{Database, DbResult, LibraryConfig};

const DEMO_CUSTOMER_EMAIL: &str = "leitora@biblio.local";

const AUTHORS: &[&str] = &[
    "Machado de Assis",
    "Clarice Lispector",
    "Jorge Amado",
    "Graciliano Ramos",
    "Cecília Meireles",
    "Guimarães Rosa",
];

const PUBLISHERS: &[&str] = &["Companhia das Letras", "Record", "Rocco", "Globo"];

const GENRES: &[&str] = &["Romance", "Poesia", "Conto", "Crônica", "Ensaio"];

const TITLE_WORDS: &[&str] = &[
    "Memórias",
    "Sertão",
    "Estrela",
    "Mar",
    "Cidade",
    "Noite",
    "Viagem",
    "Cartas",
    "Sombra",
    "Jardim",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = LibraryConfig::load()?;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut count: usize = 200;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Biblio Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of books to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./biblio.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(
        path = %config.database_path.display(),
        books = count,
        "Seeding database"
    );

    let db = Database::new(config.db_config()).await?;

    let existing = db.books().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has books, skipping seed");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = match db.managers().administrator(&config.admin_email).await? {
        Some(admin) => admin,
        None => {
            db.managers()
                .insert(&Manager {
                    id: Uuid::new_v4().to_string(),
                    code: Some(1),
                    name: "Administrador".to_string(),
                    phone: None,
                    email: config.admin_email.clone(),
                    password_hash: "!".to_string(),
                })
                .await?
        }
    };
    info!(manager_id = %admin.id, "Administrator ready");

    let mut authors = Vec::with_capacity(AUTHORS.len());
    for name in AUTHORS {
        authors.push(db.books().insert_author(name).await?);
    }
    let mut publishers = Vec::with_capacity(PUBLISHERS.len());
    for name in PUBLISHERS {
        publishers.push(db.books().insert_publisher(name).await?);
    }
    let mut genres = Vec::with_capacity(GENRES.len());
    for name in GENRES {
        genres.push(db.books().insert_genre(name).await?);
    }

    let start = std::time::Instant::now();
    let mut books = Vec::with_capacity(count);
    for seed in 0..count {
        let mut book = generate_book(&admin.id, seed);
        book.author_id = Some(authors[seed % authors.len()].clone());
        book.publisher_id = Some(publishers[seed % publishers.len()].clone());
        book.genre_id = Some(genres[seed % genres.len()].clone());

        match db.books().insert(&book).await {
            Ok(book) => books.push(book),
            Err(e) => warn!(title = %book.title, error = %e, "Failed to insert book"),
        }
    }
    info!(generated = books.len(), elapsed = ?start.elapsed(), "Catalog generated");

    let customer = ensure_demo_customer(&db).await?;
    info!(customer_id = %customer.id, "Demo customer ready");

    // Demo round trip on the two first books with copies on the shelf
    let cart: Vec<CartLine> = books
        .iter()
        .filter(|b| b.stock > 0)
        .take(2)
        .map(|b| CartLine::new(b.id.clone(), 1))
        .collect();
    if cart.is_empty() {
        warn!("No book in stock, skipping demo loan");
        return Ok(());
    }

    let engine = db.loan_engine(config.loan_policy());
    let request = LoanRequest::new(cart, config.default_loan_days);

    let receipt = engine.create_loan(&customer.id, &request).await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);

    let returned = engine.return_loan(&receipt.loan_id, &customer.id).await?;
    println!("{}", serde_json::to_string_pretty(&returned)?);

    db.close().await;
    info!("Seed complete");
    Ok(())
}

/// Looks the demo customer up by email and creates it only when missing,
/// so a reseed after the catalog was wiped reuses the same row.
async fn ensure_demo_customer(db: &Database) -> DbResult<Customer> {
    let customer = match db.customers().get_by_email(DEMO_CUSTOMER_EMAIL).await? {
        Some(customer) => customer,
        None => {
            db.customers()
                .insert(&Customer {
                    id: Uuid::new_v4().to_string(),
                    name: "Leitora Demo".to_string(),
                    email: DEMO_CUSTOMER_EMAIL.to_string(),
                    password_hash: "!".to_string(),
                    phone: Some("(11) 90000-0000".to_string()),
                    created_at: Utc::now(),
                })
                .await?
        }
    };

    db.customers()
        .upsert_address(&Address {
            customer_id: customer.id.clone(),
            state: Some("SP".to_string()),
            city: Some("São Paulo".to_string()),
            district: Some("Centro".to_string()),
            street: Some("Rua da Biblioteca".to_string()),
            number: Some("1".to_string()),
        })
        .await?;

    Ok(customer)
}

/// Generates a single book with deterministic price and stock.
fn generate_book(manager_id: &str, seed: usize) -> Book {
    let now = Utc::now();

    let first = TITLE_WORDS[seed % TITLE_WORDS.len()];
    let second = TITLE_WORDS[(seed / TITLE_WORDS.len() + 3) % TITLE_WORDS.len()];
    let title = format!("{first} e {second} vol. {}", seed + 1);

    // R$9.90 - R$89.90 in R$10.00 steps
    let price_cents = 990 + ((seed * 7) % 9) as i64 * 1000;

    Book {
        id: Uuid::new_v4().to_string(),
        title,
        isbn: Some(format!("978{:010}", seed)),
        year: Some(1900 + (seed % 124) as i32),
        author_id: None,
        publisher_id: None,
        genre_id: None,
        country_of_origin: Some("Brasil".to_string()),
        stock: (seed % 13) as i64,
        price_cents,
        manager_id: manager_id.to_string(),
        created_at: now,
        updated_at: now,
    }
}
