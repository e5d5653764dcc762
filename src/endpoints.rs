//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/invoices/{invoice_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for searching and paging through invoices.
pub const INVOICES_VIEW: &str = "/dashboard/invoices";
/// The page for creating a new invoice.
pub const NEW_INVOICE_VIEW: &str = "/dashboard/invoices/create";
/// The page for editing an existing invoice.
pub const EDIT_INVOICE_VIEW: &str = "/dashboard/invoices/{invoice_id}/edit";
/// The page listing customers and their invoice totals.
pub const CUSTOMERS_VIEW: &str = "/dashboard/customers";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/login";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create an invoice.
pub const INVOICES_API: &str = "/api/invoices";
/// The route to update or delete a single invoice.
pub const INVOICE_API: &str = "/api/invoices/{invoice_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.char_indices() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let Some(param_start) = param_start else {
        return endpoint_path.to_string();
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
