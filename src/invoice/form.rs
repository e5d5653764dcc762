//! Parsing, validation and rendering of the invoice form shared by the create and edit pages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    alert::Alert,
    customer::{CustomerField, CustomerId, fetch_customers},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    invoice::{InvoiceId, InvoiceStatus, MAX_AMOUNT},
};

pub const CUSTOMER_ERROR_MSG: &str = "Please select a customer.";
pub const AMOUNT_ERROR_MSG: &str = "Please enter an amount greater than $0.";
pub const STATUS_ERROR_MSG: &str = "Please select an invoice status.";

/// The invoice form as submitted by the browser.
///
/// Every field is optional so that missing fields are reported as validation
/// errors rather than rejected by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFormData {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    /// The amount in dollars.
    pub amount: Option<String>,
    pub status: Option<String>,
}

/// The values of a form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidInvoiceForm {
    pub customer_id: CustomerId,
    /// The amount in cents.
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// The validation message for each field of the invoice form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFormErrors {
    pub customer_id: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub status: Option<&'static str>,
}

/// Convert a dollar amount to cents, rounding to the nearest cent.
///
/// Returns `None` unless the rounded amount is at least one cent and at most
/// [MAX_AMOUNT].
pub fn dollars_to_cents(dollars: f64) -> Option<i64> {
    let cents = (dollars * 100.0).round();

    if !cents.is_finite() || cents < 1.0 || cents > MAX_AMOUNT as f64 {
        return None;
    }

    Some(cents as i64)
}

impl InvoiceFormData {
    /// Check every field, collecting the errors for all invalid fields.
    pub fn validate(&self) -> Result<ValidInvoiceForm, InvoiceFormErrors> {
        let customer_id = self
            .customer_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<CustomerId>().ok());

        let amount = self
            .amount
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .and_then(dollars_to_cents);

        let status = self
            .status
            .as_deref()
            .and_then(|raw| raw.parse::<InvoiceStatus>().ok());

        match (customer_id, amount, status) {
            (Some(customer_id), Some(amount), Some(status)) => Ok(ValidInvoiceForm {
                customer_id,
                amount,
                status,
            }),
            (customer_id, amount, status) => Err(InvoiceFormErrors {
                customer_id: customer_id.is_none().then_some(CUSTOMER_ERROR_MSG),
                amount: amount.is_none().then_some(AMOUNT_ERROR_MSG),
                status: status.is_none().then_some(STATUS_ERROR_MSG),
            }),
        }
    }
}

/// Whether the form creates a new invoice or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Create,
    Edit(InvoiceId),
}

impl FormMode {
    pub fn failure_message(&self) -> &'static str {
        match self {
            FormMode::Create => "Missing or invalid fields. Failed to create invoice.",
            FormMode::Edit(_) => "Missing or invalid fields. Failed to update invoice.",
        }
    }

    pub fn database_error_message(&self) -> &'static str {
        match self {
            FormMode::Create => "Database Error: Failed to create invoice.",
            FormMode::Edit(_) => "Database Error: Failed to update invoice.",
        }
    }
}

/// Everything needed to render the invoice form.
pub struct InvoiceFormView<'a> {
    pub mode: FormMode,
    pub customers: &'a [CustomerField],
    pub values: &'a InvoiceFormData,
    pub errors: &'a InvoiceFormErrors,
    /// Shown below the fields when the last submission was rejected.
    pub message: Option<&'a str>,
}

fn field_error(id: &str, error: Option<&str>) -> Markup {
    html! {
        div id=(id) aria-live="polite" aria-atomic="true"
        {
            @if let Some(error) = error {
                p class=(FORM_ERROR_STYLE) { (error) }
            }
        }
    }
}

impl InvoiceFormView<'_> {
    pub fn into_html(self) -> Markup {
        let selected_customer = self.values.customer_id.as_deref().unwrap_or_default();
        let amount = self.values.amount.as_deref().unwrap_or_default();
        let selected_status = self.values.status.as_deref().unwrap_or_default();

        let (hx_post, hx_put, submit_text) = match self.mode {
            FormMode::Create => (Some(endpoints::INVOICES_API.to_owned()), None, "Create Invoice"),
            FormMode::Edit(id) => (
                None,
                Some(endpoints::format_endpoint(endpoints::INVOICE_API, id)),
                "Edit Invoice",
            ),
        };

        html! {
            form
                id="invoice-form"
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="customer" class=(FORM_LABEL_STYLE) { "Choose customer" }

                    select
                        id="customer"
                        name="customerId"
                        required
                        aria-describedby="customer-error"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" disabled selected[selected_customer.is_empty()]
                        {
                            "Select a customer"
                        }

                        @for customer in self.customers {
                            @let value = customer.id.to_string();
                            option value=(value) selected[value == selected_customer]
                            {
                                (customer.name)
                            }
                        }
                    }

                    (field_error("customer-error", self.errors.customer_id))
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Choose an amount" }

                    div class="input-wrapper"
                    {
                        input
                            id="amount"
                            type="number"
                            name="amount"
                            step="0.01"
                            placeholder="Enter USD amount"
                            value=(amount)
                            required
                            aria-describedby="amount-error"
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    (field_error("amount-error", self.errors.amount))
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Set the invoice status" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for status in [InvoiceStatus::Pending, InvoiceStatus::Paid] {
                            label for=(status.as_str()) class=(FORM_RADIO_LABEL_STYLE)
                            {
                                input
                                    id=(status.as_str())
                                    type="radio"
                                    name="status"
                                    value=(status.as_str())
                                    checked[selected_status == status.as_str()]
                                    required
                                    aria-describedby="status-error"
                                    class=(FORM_RADIO_INPUT_STYLE);

                                @match status {
                                    InvoiceStatus::Pending => { "Pending" }
                                    InvoiceStatus::Paid => { "Paid" }
                                }
                            }
                        }
                    }

                    (field_error("status-error", self.errors.status))
                }

                div id="form-error" aria-live="polite" aria-atomic="true"
                {
                    @if let Some(message) = self.message {
                        p class=(FORM_ERROR_STYLE) { (message) }
                    }
                }

                div class="flex gap-4"
                {
                    a href=(endpoints::INVOICES_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
                }
            }
        }
    }
}

/// Render the form again with the rejected `values` and the `errors` for each field.
pub fn invalid_form_response(
    mode: FormMode,
    values: &InvoiceFormData,
    errors: &InvoiceFormErrors,
    connection: &Connection,
) -> Response {
    let customers = match fetch_customers(connection) {
        Ok(customers) => customers,
        Err(error) => {
            tracing::error!("Failed to fetch customers for the invoice form: {error}");
            return error.into_alert_response();
        }
    };

    InvoiceFormView {
        mode,
        customers: &customers,
        values,
        errors,
        message: Some(mode.failure_message()),
    }
    .into_html()
    .into_response()
}

/// The alert shown when saving a valid form fails.
pub fn database_error_response(mode: FormMode) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Alert::ErrorSimple {
            message: mode.database_error_message().to_owned(),
        },
    )
        .into_response()
}


#[cfg(test)]
mod form_view_tests {
    use scraper::{Html, Selector};

    use crate::{
        customer::CustomerField,
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, must_get_form, validation_message,
        },
    };

    use super::{FormMode, InvoiceFormData, InvoiceFormErrors, InvoiceFormView};

    fn customers() -> Vec<CustomerField> {
        vec![
            CustomerField {
                id: 1,
                name: "Amy Burns".to_owned(),
            },
            CustomerField {
                id: 2,
                name: "Evil Rabbit".to_owned(),
            },
        ]
    }

    #[test]
    fn edit_form_puts_to_invoice_and_selects_values() {
        let customers = customers();
        let values = InvoiceFormData {
            customer_id: Some("2".to_owned()),
            amount: Some("12.34".to_owned()),
            status: Some("paid".to_owned()),
        };

        let html = InvoiceFormView {
            mode: FormMode::Edit(7),
            customers: &customers,
            values: &values,
            errors: &InvoiceFormErrors::default(),
            message: None,
        }
        .into_html()
        .into_string();
        let fragment = Html::parse_fragment(&html);
        let form = must_get_form(&fragment);

        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::INVOICE_API, 7),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "12.34");

        let selected = Selector::parse("option[selected]").unwrap();
        let selected = form.select(&selected).next().expect("no selected customer");
        assert_eq!(selected.value().attr("value"), Some("2"));

        let checked = Selector::parse("input[type=radio][checked]").unwrap();
        let checked = form.select(&checked).next().expect("no checked status");
        assert_eq!(checked.value().attr("value"), Some("paid"));
    }

    #[test]
    fn shows_field_errors() {
        let customers = customers();
        let errors = InvoiceFormErrors {
            customer_id: Some("Please select a customer."),
            amount: None,
            status: Some("Please select an invoice status."),
        };

        let html = InvoiceFormView {
            mode: FormMode::Create,
            customers: &customers,
            values: &InvoiceFormData::default(),
            errors: &errors,
            message: Some(FormMode::Create.failure_message()),
        }
        .into_html()
        .into_string();
        let fragment = Html::parse_fragment(&html);

        assert_eq!(
            validation_message(&fragment, "customer-error").as_deref(),
            Some("Please select a customer.")
        );
        assert_eq!(validation_message(&fragment, "amount-error"), None);
        assert_eq!(
            validation_message(&fragment, "status-error").as_deref(),
            Some("Please select an invoice status.")
        );
        assert_eq!(
            validation_message(&fragment, "form-error").as_deref(),
            Some("Missing or invalid fields. Failed to create invoice.")
        );
    }
}

#[cfg(test)]
mod form_data_tests {
    use super::InvoiceFormData;

    #[test]
    fn parses_browser_field_names() {
        let form: InvoiceFormData =
            serde_html_form::from_str("customerId=2&amount=12.34&status=pending").unwrap();

        assert_eq!(
            form,
            InvoiceFormData {
                customer_id: Some("2".to_owned()),
                amount: Some("12.34".to_owned()),
                status: Some("pending".to_owned()),
            }
        );
    }

    #[test]
    fn empty_and_missing_fields_are_none() {
        let form: InvoiceFormData = serde_html_form::from_str("customerId=&amount=5").unwrap();

        assert_eq!(form.customer_id, None);
        assert_eq!(form.amount.as_deref(), Some("5"));
        assert_eq!(form.status, None);
    }
}
