//! The searchable customer roster with per-customer invoice totals.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::{Connection, Row};

use crate::{
    AppState, Error,
    customer::CustomerId,
    db::like_pattern,
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, search_input,
    },
    navigation::NavBar,
    pagination::SearchQuery,
};

/// A customer with the totals of their invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    /// The sum of pending invoices in cents.
    pub total_pending: i64,
    /// The sum of paid invoices in cents.
    pub total_paid: i64,
}

fn map_row_to_customer_summary(row: &Row) -> Result<CustomerSummary, rusqlite::Error> {
    Ok(CustomerSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        image_url: row.get(3)?,
        total_invoices: row.get(4)?,
        total_pending: row.get(5)?,
        total_paid: row.get(6)?,
    })
}

/// Get the customers whose name or email contains `query`, ignoring ASCII case,
/// along with their invoice totals. Customers are ordered by name.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL error occurred.
pub fn fetch_filtered_customers(
    query: &str,
    connection: &Connection,
) -> Result<Vec<CustomerSummary>, Error> {
    connection
        .prepare(
            "SELECT
                customer.id,
                customer.name,
                customer.email,
                customer.image_url,
                COUNT(invoice.id),
                COALESCE(SUM(CASE WHEN invoice.status = 'pending' THEN invoice.amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN invoice.status = 'paid' THEN invoice.amount ELSE 0 END), 0)
            FROM customer
            LEFT JOIN invoice ON customer.id = invoice.customer_id
            WHERE customer.name LIKE :pattern ESCAPE '\\'
                OR customer.email LIKE :pattern ESCAPE '\\'
            GROUP BY customer.id, customer.name, customer.email, customer.image_url
            ORDER BY customer.name ASC",
        )?
        .query_map(
            &[(":pattern", &like_pattern(query))],
            map_row_to_customer_summary,
        )?
        .map(|maybe_customer| maybe_customer.map_err(Error::from))
        .collect()
}

/// The state needed for the customers page.
#[derive(Debug, Clone)]
pub struct CustomersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the customers page, filtered by the `query` parameter.
pub async fn get_customers_page(
    State(state): State<CustomersPageState>,
    Query(search): Query<SearchQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customers = fetch_filtered_customers(search.query(), &connection)
        .inspect_err(|error| tracing::error!("Failed to fetch customer table: {error}"))?;

    Ok(customers_view(&customers, search.query()).into_response())
}

const CUSTOMERS_TABLE_ID: &str = "customers-table";

fn customer_avatar(customer: &CustomerSummary) -> Markup {
    html! {
        img
            src=(customer.image_url)
            alt={ (customer.name) "'s profile picture" }
            width="28"
            height="28"
            class="rounded-full";
    }
}

fn customers_view(customers: &[CustomerSummary], query: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();
    let table_selector = format!("#{CUSTOMERS_TABLE_ID}");

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Customers" }
                }

                (search_input(
                    endpoints::CUSTOMERS_VIEW,
                    &table_selector,
                    "Search customers...",
                    query,
                ))

                section id=(CUSTOMERS_TABLE_ID) class="dark:bg-gray-800 w-full"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total Invoices" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total Pending" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total Paid" }
                            }
                        }

                        tbody
                        {
                            @for customer in customers {
                                tr class=(TABLE_ROW_STYLE) data-customer-row="true"
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        div class="flex items-center gap-3"
                                        {
                                            (customer_avatar(customer))
                                            span { (customer.name) }
                                        }
                                    }
                                    td class=(TABLE_CELL_STYLE) { (customer.email) }
                                    td class=(TABLE_CELL_STYLE) { (customer.total_invoices) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(customer.total_pending)) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(customer.total_paid)) }
                                }
                            }

                            @if customers.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No customers found."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Customers", &[], &content)
}
