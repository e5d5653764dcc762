//! The most recent invoices shown on the dashboard.

use maud::{Markup, html};
use rusqlite::{Connection, Row};

use crate::{Error, endpoints, html::{LINK_STYLE, format_currency}, invoice::InvoiceId};

/// The number of invoices shown on the dashboard.
const LATEST_INVOICE_COUNT: i64 = 5;

/// A recent invoice with its customer's details.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestInvoice {
    pub id: InvoiceId,
    pub name: String,
    pub email: String,
    pub image_url: String,
    /// The amount formatted as currency.
    pub amount: String,
}

fn map_row_to_latest_invoice(row: &Row) -> Result<LatestInvoice, rusqlite::Error> {
    Ok(LatestInvoice {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        image_url: row.get(3)?,
        amount: format_currency(row.get(4)?),
    })
}

/// Get the five newest invoices, breaking ties on date by the newest ID.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_latest_invoices(connection: &Connection) -> Result<Vec<LatestInvoice>, Error> {
    connection
        .prepare(
            "SELECT invoice.id, customer.name, customer.email, customer.image_url, invoice.amount
            FROM invoice
            INNER JOIN customer ON invoice.customer_id = customer.id
            ORDER BY invoice.date DESC, invoice.id DESC
            LIMIT ?1",
        )?
        .query_map([LATEST_INVOICE_COUNT], map_row_to_latest_invoice)?
        .map(|maybe_invoice| maybe_invoice.map_err(Error::from))
        .collect()
}

pub(super) fn latest_invoices_view(invoices: &[LatestInvoice]) -> Markup {
    html! {
        section id="latest-invoices" class="flex w-full flex-col"
        {
            h2 class="mb-4 text-xl font-semibold" { "Latest Invoices" }

            div class="flex grow flex-col justify-between rounded-xl bg-gray-100 dark:bg-gray-800 p-4"
            {
                @if invoices.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400" { "No invoices yet." }
                } @else {
                    ul class="bg-white dark:bg-gray-700 px-6 rounded"
                    {
                        @for invoice in invoices {
                            li
                                data-latest-invoice="true"
                                class="flex items-center justify-between py-4
                                    border-t first:border-t-0 border-gray-200 dark:border-gray-600"
                            {
                                div class="flex items-center gap-4 min-w-0"
                                {
                                    img
                                        src=(invoice.image_url)
                                        alt={ (invoice.name) "'s profile picture" }
                                        width="32"
                                        height="32"
                                        class="rounded-full";

                                    div class="min-w-0"
                                    {
                                        p class="truncate text-sm font-semibold" { (invoice.name) }
                                        p class="hidden truncate text-sm text-gray-500 sm:block" { (invoice.email) }
                                    }
                                }

                                p class="truncate text-sm font-medium" { (invoice.amount) }
                            }
                        }
                    }
                }

                p class="pt-4 text-sm"
                {
                    a href=(endpoints::INVOICES_VIEW) class=(LINK_STYLE) { "View all invoices" }
                }
            }
        }
    }
}

#[cfg(test)]
mod fetch_latest_invoices_tests {
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        customer::insert_customer,
        db::initialize,
        invoice::{InvoiceStatus, NewInvoice, insert_invoice},
    };

    use super::fetch_latest_invoices;

    #[test]
    fn returns_five_newest_invoices() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let lee =
            insert_customer("Lee Robinson", "lee@robinson.com", "/lee.png", &connection).unwrap();
        let start = date!(2023 - 01 - 01);
        for day in 0..7 {
            insert_invoice(
                NewInvoice {
                    customer_id: lee.id,
                    amount: 100 * (day + 1),
                    status: InvoiceStatus::Paid,
                    date: start + Duration::days(day),
                },
                &connection,
            )
            .unwrap();
        }

        let got = fetch_latest_invoices(&connection).unwrap();

        assert_eq!(
            got.iter().map(|invoice| invoice.id).collect::<Vec<_>>(),
            vec![7, 6, 5, 4, 3]
        );
        assert_eq!(got[0].amount, "$7.00");
        assert_eq!(got[0].name, "Lee Robinson");
    }
}
