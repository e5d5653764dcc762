//! Read queries for the invoices table and the edit form.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    customer::CustomerId,
    db::like_pattern,
    invoice::{InvoiceId, InvoiceStatus, core::get_invoice},
    pagination::{ITEMS_PER_PAGE, page_count},
};

/// An invoice joined with its customer for the invoices table.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: Date,
    /// The amount in cents.
    pub amount: i64,
    pub status: InvoiceStatus,
}

fn map_row_to_invoice_row(row: &Row) -> Result<InvoiceRow, rusqlite::Error> {
    Ok(InvoiceRow {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        image_url: row.get(4)?,
        date: row.get(5)?,
        amount: row.get(6)?,
        status: row.get(7)?,
    })
}

/// The filter shared by the search and page count queries.
const INVOICE_SEARCH_FILTER: &str = "customer.name LIKE :pattern ESCAPE '\\'
    OR customer.email LIKE :pattern ESCAPE '\\'
    OR CAST(invoice.amount AS TEXT) LIKE :pattern ESCAPE '\\'
    OR invoice.date LIKE :pattern ESCAPE '\\'
    OR invoice.status LIKE :pattern ESCAPE '\\'";

/// Get one page of the invoices that match `query`, newest first.
///
/// The query is matched, ignoring ASCII case, against the customer's name and
/// email and the invoice's amount in cents, date (YYYY-MM-DD) and status.
/// `page` is 1-based; a page past the end is empty.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_filtered_invoices(
    query: &str,
    page: u64,
    connection: &Connection,
) -> Result<Vec<InvoiceRow>, Error> {
    let offset = page.saturating_sub(1).saturating_mul(ITEMS_PER_PAGE);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let sql = format!(
        "SELECT
            invoice.id,
            invoice.customer_id,
            customer.name,
            customer.email,
            customer.image_url,
            invoice.date,
            invoice.amount,
            invoice.status
        FROM invoice
        INNER JOIN customer ON invoice.customer_id = customer.id
        WHERE {INVOICE_SEARCH_FILTER}
        ORDER BY invoice.date DESC, invoice.id DESC
        LIMIT :limit OFFSET :offset"
    );

    connection
        .prepare(&sql)?
        .query_map(
            rusqlite::named_params! {
                ":pattern": like_pattern(query),
                ":limit": ITEMS_PER_PAGE as i64,
                ":offset": offset,
            },
            map_row_to_invoice_row,
        )?
        .map(|maybe_invoice| maybe_invoice.map_err(Error::from))
        .collect()
}

/// Count the pages needed to show every invoice that matches `query`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_invoices_pages(query: &str, connection: &Connection) -> Result<u64, Error> {
    let sql = format!(
        "SELECT COUNT(*)
        FROM invoice
        INNER JOIN customer ON invoice.customer_id = customer.id
        WHERE {INVOICE_SEARCH_FILTER}"
    );

    let count: i64 = connection.query_row(
        &sql,
        &[(":pattern", &like_pattern(query))],
        |row| row.get(0),
    )?;

    Ok(page_count(count.max(0) as u64))
}

/// An invoice prepared for the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableInvoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    /// The amount in dollars.
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// Get the invoice `id` with its amount converted to dollars.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if there is no invoice with `id`,
/// - [Error::SqlError] if another SQL error occurred.
pub fn fetch_invoice_by_id(id: InvoiceId, connection: &Connection) -> Result<EditableInvoice, Error> {
    let invoice = get_invoice(id, connection)?;

    Ok(EditableInvoice {
        id: invoice.id,
        customer_id: invoice.customer_id,
        amount: invoice.amount as f64 / 100.0,
        status: invoice.status,
    })
}
