//! The page and endpoint for editing an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    customer::fetch_customers,
    endpoints,
    invoice::{
        InvoiceId,
        core::update_invoice,
        create::invoice_form_page,
        form::{
            CUSTOMER_ERROR_MSG, FormMode, InvoiceFormData, InvoiceFormErrors, InvoiceFormView,
            database_error_response, invalid_form_response,
        },
        query::fetch_invoice_by_id,
    },
};

/// The state needed to edit an invoice.
#[derive(Debug, Clone)]
pub struct EditInvoiceState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the form for editing the invoice `invoice_id`, or the 404 page if it does not exist.
pub async fn get_edit_invoice_page(
    State(state): State<EditInvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoice = fetch_invoice_by_id(invoice_id, &connection).inspect_err(|error| match error {
        Error::NotFound => tracing::debug!("tried to edit missing invoice {invoice_id}"),
        error => tracing::error!("Failed to retrieve invoice {invoice_id}: {error}"),
    })?;
    let customers = fetch_customers(&connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve customers for edit invoice page: {error}")
    })?;

    let values = InvoiceFormData {
        customer_id: Some(invoice.customer_id.to_string()),
        amount: Some(format!("{:.2}", invoice.amount)),
        status: Some(invoice.status.to_string()),
    };

    let form = InvoiceFormView {
        mode: FormMode::Edit(invoice.id),
        customers: &customers,
        values: &values,
        errors: &InvoiceFormErrors::default(),
        message: None,
    }
    .into_html();

    Ok(invoice_form_page("Edit Invoice", endpoints::INVOICES_VIEW, form).into_response())
}

/// A route handler for updating an invoice, redirects to the invoices view on success.
pub async fn edit_invoice_endpoint(
    State(state): State<EditInvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
    Form(form): Form<InvoiceFormData>,
) -> Response {
    let mode = FormMode::Edit(invoice_id);

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
            return invalid_form_response(mode, &form, &errors, &connection);
        }
    };

    match update_invoice(
        invoice_id,
        valid_form.customer_id,
        valid_form.amount,
        valid_form.status,
        &connection,
    ) {
        Ok(()) => tracing::info!("updated invoice {invoice_id}"),
        Err(Error::InvalidCustomer) => {
            let errors = InvoiceFormErrors {
                customer_id: Some(CUSTOMER_ERROR_MSG),
                ..Default::default()
            };
            return invalid_form_response(mode, &form, &errors, &connection);
        }
        Err(Error::UpdateMissingInvoice) => {
            tracing::warn!("tried to update missing invoice {invoice_id}");
            return Error::UpdateMissingInvoice.into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not update invoice {invoice_id}: {error}");
            return database_error_response(mode);
        }
    }

    (
        HxRedirect(endpoints::INVOICES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}


#[cfg(test)]
mod edit_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        customer::insert_customer,
        db::initialize,
        endpoints,
        invoice::{InvoiceStatus, NewInvoice, core::get_invoice, form::InvoiceFormData, insert_invoice},
        test_utils::assert_hx_redirect,
    };

    use super::{EditInvoiceState, edit_invoice_endpoint};

    fn get_test_state() -> EditInvoiceState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let lee =
            insert_customer("Lee Robinson", "lee@robinson.com", "/lee.png", &connection).unwrap();
        insert_customer("Amy Burns", "amy@burns.com", "/amy.png", &connection).unwrap();
        insert_invoice(
            NewInvoice {
                customer_id: lee.id,
                amount: 1000,
                status: InvoiceStatus::Pending,
                date: date!(2023 - 06 - 17),
            },
            &connection,
        )
        .unwrap();

        EditInvoiceState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(customer_id: &str, amount: &str, status: &str) -> InvoiceFormData {
        InvoiceFormData {
            customer_id: Some(customer_id.to_owned()),
            amount: Some(amount.to_owned()),
            status: Some(status.to_owned()),
        }
    }

    #[tokio::test]
    async fn updates_invoice_and_keeps_date() {
        let state = get_test_state();

        let response = edit_invoice_endpoint(
            State(state.clone()),
            Path(1),
            Form(form("2", "99.99", "paid")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::INVOICES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let invoice = get_invoice(1, &connection).unwrap();
        assert_eq!(invoice.customer_id, 2);
        assert_eq!(invoice.amount, 9999);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.date, date!(2023 - 06 - 17));
    }

    #[tokio::test]
    async fn missing_invoice_returns_not_found_alert() {
        let response = edit_invoice_endpoint(
            State(get_test_state()),
            Path(42),
            Form(form("1", "10", "paid")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_form_leaves_invoice_unchanged() {
        let state = get_test_state();

        let response = edit_invoice_endpoint(
            State(state.clone()),
            Path(1),
            Form(form("1", "-3", "paid")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        let invoice = get_invoice(1, &connection).unwrap();
        assert_eq!(invoice.amount, 1000);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }
}
