use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Date, macros::date};

use invoice_dashboard::{
    InvoiceStatus, NewInvoice, PasswordHash, Revenue, ValidatedPassword, create_user,
    initialize_db, insert_customer, insert_invoice, insert_revenue,
};

/// A utility for creating a test database for the Acme invoice dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_USER_EMAIL: &str = "user@nextmail.com";
const TEST_USER_PASSWORD: &str = "123456";

const CUSTOMERS: [(&str, &str, &str); 6] = [
    (
        "Evil Rabbit",
        "evil@rabbit.com",
        "/static/customers/evil-rabbit.png",
    ),
    (
        "Delba de Oliveira",
        "delba@oliveira.com",
        "/static/customers/delba-de-oliveira.png",
    ),
    (
        "Lee Robinson",
        "lee@robinson.com",
        "/static/customers/lee-robinson.png",
    ),
    (
        "Michael Novotny",
        "michael@novotny.com",
        "/static/customers/michael-novotny.png",
    ),
    (
        "Amy Burns",
        "amy@burns.com",
        "/static/customers/amy-burns.png",
    ),
    (
        "Balazs Orban",
        "balazs@orban.com",
        "/static/customers/balazs-orban.png",
    ),
];

/// (customer index, amount in cents, status, date)
const INVOICES: [(usize, i64, InvoiceStatus, Date); 13] = [
    (0, 15795, InvoiceStatus::Pending, date!(2022 - 12 - 06)),
    (1, 20348, InvoiceStatus::Pending, date!(2022 - 11 - 14)),
    (4, 3040, InvoiceStatus::Paid, date!(2022 - 10 - 29)),
    (3, 44800, InvoiceStatus::Paid, date!(2023 - 09 - 10)),
    (5, 34577, InvoiceStatus::Pending, date!(2023 - 08 - 05)),
    (2, 54246, InvoiceStatus::Pending, date!(2023 - 07 - 16)),
    (0, 666, InvoiceStatus::Pending, date!(2023 - 06 - 27)),
    (3, 32545, InvoiceStatus::Paid, date!(2023 - 06 - 09)),
    (4, 1250, InvoiceStatus::Paid, date!(2023 - 06 - 17)),
    (5, 8546, InvoiceStatus::Paid, date!(2023 - 06 - 07)),
    (1, 500, InvoiceStatus::Paid, date!(2023 - 08 - 19)),
    (5, 8945, InvoiceStatus::Paid, date!(2023 - 06 - 03)),
    (2, 1000, InvoiceStatus::Paid, date!(2022 - 06 - 05)),
];

const REVENUE: [(&str, i64); 12] = [
    ("Jan", 2000),
    ("Feb", 1800),
    ("Mar", 2200),
    ("Apr", 2500),
    ("May", 2300),
    ("Jun", 3200),
    ("Jul", 3500),
    ("Aug", 3700),
    ("Sep", 2500),
    ("Oct", 2800),
    ("Nov", 3000),
    ("Dec", 4800),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let tx = conn.transaction()?;

    println!("Creating test user...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new(TEST_USER_PASSWORD)?,
        PasswordHash::DEFAULT_COST,
    )?;
    create_user(
        "User",
        EmailAddress::new_unchecked(TEST_USER_EMAIL),
        password_hash,
        &tx,
    )?;

    println!("Creating {} customers...", CUSTOMERS.len());
    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email, image_url) in CUSTOMERS {
        customer_ids.push(insert_customer(name, email, image_url, &tx)?.id);
    }

    println!("Creating {} invoices...", INVOICES.len());
    for (customer_index, amount, status, date) in INVOICES {
        insert_invoice(
            NewInvoice {
                customer_id: customer_ids[customer_index],
                amount,
                status,
                date,
            },
            &tx,
        )?;
    }

    println!("Creating revenue for {} months...", REVENUE.len());
    for (month, revenue) in REVENUE {
        insert_revenue(
            &Revenue {
                month: month.to_owned(),
                revenue,
            },
            &tx,
        )?;
    }

    tx.commit()?;

    println!("Success! Log in with {TEST_USER_EMAIL} and the password {TEST_USER_PASSWORD:?}.");

    Ok(())
}
