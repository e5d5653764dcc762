//! The page and endpoint for creating an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    customer::{CustomerField, fetch_customers},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    invoice::{
        NewInvoice,
        core::insert_invoice,
        form::{
            CUSTOMER_ERROR_MSG, FormMode, InvoiceFormData, InvoiceFormErrors, InvoiceFormView,
            database_error_response, invalid_form_response,
        },
    },
    navigation::NavBar,
    timezone::{get_local_offset, today},
};

/// The state needed to create an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Wraps an invoice form in a page with a heading.
pub fn invoice_form_page(title: &str, active_endpoint: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(active_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            nav aria-label="Breadcrumb" class="w-full mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                ol class="flex gap-2"
                {
                    li { a href=(endpoints::INVOICES_VIEW) class="hover:underline" { "Invoices" } }
                    li aria-hidden="true" { "/" }
                    li aria-current="page" class="font-medium text-gray-900 dark:text-white" { (title) }
                }
            }

            (form)
        }
    };

    base(title, &[dollar_input_styles()], &content)
}

fn create_invoice_view(customers: &[CustomerField]) -> Markup {
    let form = InvoiceFormView {
        mode: FormMode::Create,
        customers,
        values: &InvoiceFormData::default(),
        errors: &InvoiceFormErrors::default(),
        message: None,
    }
    .into_html();

    invoice_form_page("Create Invoice", endpoints::INVOICES_VIEW, form)
}

/// Renders the page for creating an invoice.
pub async fn get_create_invoice_page(
    State(state): State<CreateInvoiceState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customers = fetch_customers(&connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve customers for new invoice page: {error}")
    })?;

    Ok(create_invoice_view(&customers).into_response())
}

/// A route handler for creating an invoice dated today, redirects to the invoices view on success.
pub async fn create_invoice_endpoint(
    State(state): State<CreateInvoiceState>,
    Form(form): Form<InvoiceFormData>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let valid_form = match form.validate() {
        Ok(valid_form) => valid_form,
        Err(errors) => {
            tracing::debug!("rejected invoice form: {errors:?}");
            return invalid_form_response(FormMode::Create, &form, &errors, &connection);
        }
    };

    let invoice = NewInvoice {
        customer_id: valid_form.customer_id,
        amount: valid_form.amount,
        status: valid_form.status,
        date: today(local_offset),
    };

    match insert_invoice(invoice, &connection) {
        Ok(invoice) => {
            tracing::info!("created invoice {}", invoice.id);
        }
        Err(Error::InvalidCustomer) => {
            let errors = InvoiceFormErrors {
                customer_id: Some(CUSTOMER_ERROR_MSG),
                ..Default::default()
            };
            return invalid_form_response(FormMode::Create, &form, &errors, &connection);
        }
        Err(error) => {
            tracing::error!("could not create invoice: {error}");
            return database_error_response(FormMode::Create);
        }
    }

    (
        HxRedirect(endpoints::INVOICES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
