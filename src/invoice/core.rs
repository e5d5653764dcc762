//! The invoice type and the statements that change invoices.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::{Error, customer::CustomerId};

/// The ID of an invoice in the database.
pub type InvoiceId = i64;

/// Whether an invoice has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    /// The invoice is waiting to be paid.
    Pending,
    /// The invoice has been paid.
    Paid,
}

impl InvoiceStatus {
    /// The lowercase name used in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text is not one of the invoice statuses.
#[derive(Debug, PartialEq)]
pub struct InvalidStatusError(String);

impl Display for InvalidStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" is not an invoice status", self.0)
    }
}

impl std::error::Error for InvalidStatusError {}

impl FromStr for InvoiceStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(InvalidStatusError(other.to_owned())),
        }
    }
}

impl ToSql for InvoiceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for InvoiceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A billing record for a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    /// The amount in cents.
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: Date,
}

/// An invoice that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    /// The customer being billed. Must refer to an existing customer.
    pub customer_id: CustomerId,
    /// The amount in cents.
    pub amount: i64,
    /// Whether the invoice has been paid.
    pub status: InvoiceStatus,
    /// The date the invoice was issued.
    pub date: Date,
}

/// The largest amount an invoice can hold, in cents ($1,000,000,000.00).
pub const MAX_AMOUNT: i64 = 100_000_000_000;

/// Create the invoice table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(id) ON DELETE CASCADE,
            amount INTEGER NOT NULL CHECK (amount >= 0 AND amount <= {MAX_AMOUNT}),
            status TEXT NOT NULL CHECK (status IN ('pending', 'paid')),
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_invoice_date ON invoice(date);
        CREATE INDEX IF NOT EXISTS idx_invoice_customer_id ON invoice(customer_id);"
    ))?;

    Ok(())
}

/// Insert an invoice and return it with its generated ID.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidCustomer] if the customer does not exist,
/// - [Error::SqlError] if another SQL error occurred.
pub fn insert_invoice(invoice: NewInvoice, connection: &Connection) -> Result<Invoice, Error> {
    connection.execute(
        "INSERT INTO invoice (customer_id, amount, status, date) VALUES (?1, ?2, ?3, ?4)",
        (
            invoice.customer_id,
            invoice.amount,
            invoice.status,
            invoice.date,
        ),
    )?;

    Ok(Invoice {
        id: connection.last_insert_rowid(),
        customer_id: invoice.customer_id,
        amount: invoice.amount,
        status: invoice.status,
        date: invoice.date,
    })
}

/// Change the customer, amount and status of the invoice `id`.
///
/// The invoice date is left unchanged.
///
/// # Errors
///
/// Returns:
/// - [Error::UpdateMissingInvoice] if there is no invoice with `id`,
/// - [Error::InvalidCustomer] if the customer does not exist,
/// - [Error::SqlError] if another SQL error occurred.
pub fn update_invoice(
    id: InvoiceId,
    customer_id: CustomerId,
    amount: i64,
    status: InvoiceStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE invoice SET customer_id = ?1, amount = ?2, status = ?3 WHERE id = ?4",
        (customer_id, amount, status, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingInvoice);
    }

    Ok(())
}

/// Delete the invoice `id`.
///
/// Returns whether an invoice was deleted. Deleting an invoice that does not
/// exist is not an error.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn delete_invoice(id: InvoiceId, connection: &Connection) -> Result<bool, Error> {
    let rows_affected = connection.execute("DELETE FROM invoice WHERE id = ?1", [id])?;

    Ok(rows_affected > 0)
}

fn map_row_to_invoice(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        amount: row.get(2)?,
        status: row.get(3)?,
        date: row.get(4)?,
    })
}

/// Get the invoice `id` with the amount in cents.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if there is no invoice with `id`,
/// - [Error::SqlError] if another SQL error occurred.
pub fn get_invoice(id: InvoiceId, connection: &Connection) -> Result<Invoice, Error> {
    connection
        .prepare("SELECT id, customer_id, amount, status, date FROM invoice WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_invoice)
        .map_err(|error| error.into())
}

#[cfg(test)]
mod invoice_status_tests {
    use super::InvoiceStatus;

    #[test]
    fn parses_known_statuses() {
        assert_eq!("pending".parse(), Ok(InvoiceStatus::Pending));
        assert_eq!("paid".parse(), Ok(InvoiceStatus::Paid));
    }

    #[test]
    fn rejects_other_text() {
        assert!("PAID".parse::<InvoiceStatus>().is_err());
        assert!("overdue".parse::<InvoiceStatus>().is_err());
        assert!("".parse::<InvoiceStatus>().is_err());
    }
}
