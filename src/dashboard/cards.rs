//! The summary cards at the top of the dashboard.
//!
//! The three queries behind the cards are independent, so each one runs on
//! the blocking thread pool and the results are joined.

use std::sync::{Arc, Mutex};

use maud::{Markup, html};
use rusqlite::Connection;

use crate::{Error, html::format_currency};

/// The numbers shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    /// The sum of paid invoices formatted as currency.
    pub total_paid_invoices: String,
    /// The sum of pending invoices formatted as currency.
    pub total_pending_invoices: String,
}

fn count_invoices(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM invoice", [], |row| row.get(0))
        .map_err(Error::from)
}

fn count_customers(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))
        .map_err(Error::from)
}

/// The sums of paid and pending invoices in cents.
fn sum_invoices_by_status(connection: &Connection) -> Result<(i64, i64), Error> {
    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)
            FROM invoice",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(Error::from)
}

/// Run `query` on the blocking thread pool with its own lock on the database.
async fn run_blocking_query<T, F>(db_connection: Arc<Mutex<Connection>>, query: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        query(&connection)
    })
    .await
    .map_err(|error| {
        tracing::error!("database task failed: {error}");
        Error::TaskJoinError(error.to_string())
    })?
}

/// Get the invoice and customer counts and the invoice totals.
///
/// # Errors
///
/// Returns the first error of the three queries, or an [Error::TaskJoinError]
/// if a query task panicked.
pub async fn fetch_card_data(db_connection: Arc<Mutex<Connection>>) -> Result<CardData, Error> {
    let (number_of_invoices, number_of_customers, (total_paid, total_pending)) = tokio::try_join!(
        run_blocking_query(db_connection.clone(), count_invoices),
        run_blocking_query(db_connection.clone(), count_customers),
        run_blocking_query(db_connection, sum_invoices_by_status),
    )?;

    Ok(CardData {
        number_of_invoices,
        number_of_customers,
        total_paid_invoices: format_currency(total_paid),
        total_pending_invoices: format_currency(total_pending),
    })
}

fn card(title: &str, value: &str) -> Markup {
    html! {
        div class="rounded-xl bg-gray-100 dark:bg-gray-800 p-2 shadow-sm"
        {
            div class="flex p-4"
            {
                h3 class="text-sm font-medium" { (title) }
            }

            p
                class="truncate rounded-xl bg-white dark:bg-gray-700 px-4 py-8
                    text-center text-2xl"
            {
                (value)
            }
        }
    }
}

pub(super) fn cards_view(data: &CardData) -> Markup {
    html! {
        section
            id="cards"
            class="grid w-full gap-6 sm:grid-cols-2 lg:grid-cols-4"
        {
            (card("Collected", &data.total_paid_invoices))
            (card("Pending", &data.total_pending_invoices))
            (card("Total Invoices", &data.number_of_invoices.to_string()))
            (card("Total Customers", &data.number_of_customers.to_string()))
        }
    }
}
