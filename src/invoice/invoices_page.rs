//! The searchable, paginated invoices table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency, format_date_to_local,
        search_input,
    },
    invoice::{
        InvoiceStatus,
        query::{InvoiceRow, fetch_filtered_invoices, fetch_invoices_pages},
    },
    navigation::NavBar,
    pagination::{SearchQuery, pagination_view},
};

/// The state needed for the invoices page.
#[derive(Debug, Clone)]
pub struct InvoicesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InvoicesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render one page of the invoices matching the `query` parameter.
pub async fn get_invoices_page(
    State(state): State<InvoicesPageState>,
    Query(search): Query<SearchQuery>,
) -> Result<Response, Error> {
    let query = search.query();
    let page = search.page();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoices = fetch_filtered_invoices(query, page, &connection)
        .inspect_err(|error| tracing::error!("Failed to fetch invoices: {error}"))?;
    let page_count = fetch_invoices_pages(query, &connection)
        .inspect_err(|error| tracing::error!("Failed to count invoice pages: {error}"))?;

    Ok(invoices_view(&invoices, query, page, page_count).into_response())
}

const INVOICES_TABLE_ID: &str = "invoices-table";

fn status_badge(status: InvoiceStatus) -> Markup {
    let (style, text) = match status {
        InvoiceStatus::Pending => ("bg-gray-100 text-gray-500 dark:bg-gray-700 dark:text-gray-300", "Pending"),
        InvoiceStatus::Paid => ("bg-green-500 text-white", "Paid"),
    };

    html! {
        span class={ "inline-flex items-center rounded-full px-2 py-1 text-xs " (style) }
        {
            (text)
        }
    }
}

fn invoice_row_view(invoice: &InvoiceRow) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_INVOICE_VIEW, invoice.id);
    let delete_url = endpoints::format_endpoint(endpoints::INVOICE_API, invoice.id);
    let confirm_message = format!(
        "Are you sure you want to delete the invoice for {}? This cannot be undone.",
        invoice.name
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-invoice-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    img
                        src=(invoice.image_url)
                        alt={ (invoice.name) "'s profile picture" }
                        width="28"
                        height="28"
                        class="rounded-full";
                    span { (invoice.name) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (invoice.email) }
            td class=(TABLE_CELL_STYLE) { (format_currency(invoice.amount)) }
            td class=(TABLE_CELL_STYLE) { (format_date_to_local(invoice.date)) }
            td class=(TABLE_CELL_STYLE) { (status_badge(invoice.status)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn invoices_view(invoices: &[InvoiceRow], query: &str, page: u64, page_count: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::INVOICES_VIEW).into_html();
    let table_selector = format!("#{INVOICES_TABLE_ID}");

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Invoices" }
                }

                div class="flex items-center gap-2"
                {
                    (search_input(
                        endpoints::INVOICES_VIEW,
                        &table_selector,
                        "Search invoices...",
                        query,
                    ))

                    a
                        href=(endpoints::NEW_INVOICE_VIEW)
                        class={ "!w-auto whitespace-nowrap " (BUTTON_PRIMARY_STYLE) }
                    {
                        "Create Invoice"
                    }
                }

                section id=(INVOICES_TABLE_ID) class="dark:bg-gray-800 w-full space-y-4"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Customer" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    span class="sr-only" { "Actions" }
                                }
                            }
                        }

                        tbody
                        {
                            @for invoice in invoices {
                                (invoice_row_view(invoice))
                            }

                            @if invoices.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No invoices found."
                                    }
                                }
                            }
                        }
                    }

                    (pagination_view(endpoints::INVOICES_VIEW, query, page, page_count))
                }
            }
        }
    );

    base("Invoices", &[], &content)
}
