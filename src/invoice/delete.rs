//! Defines the endpoint for deleting an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    invoice::{InvoiceId, core::delete_invoice},
};

/// The state needed to delete an invoice.
#[derive(Debug, Clone)]
pub struct DeleteInvoiceState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an invoice.
///
/// Deleting an invoice that does not exist succeeds, so HTMX removes the row either way.
pub async fn delete_invoice_endpoint(
    State(state): State<DeleteInvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_invoice(invoice_id, &connection) {
        Ok(true) => tracing::info!("deleted invoice {invoice_id}"),
        Ok(false) => tracing::debug!("tried to delete missing invoice {invoice_id}"),
        Err(error) => {
            tracing::error!("could not delete invoice {invoice_id}: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::ErrorSimple {
                    message: "Database Error: Failed to delete invoice.".to_owned(),
                },
            )
                .into_response();
        }
    }

    Alert::Success {
        message: "Invoice deleted".to_owned(),
        details: String::new(),
    }
    .into_oob_html()
    .into_response()
}
