//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    customer::get_customers_page,
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    invoice::{
        create_invoice_endpoint, delete_invoice_endpoint, edit_invoice_endpoint,
        get_create_invoice_page, get_edit_invoice_page, get_invoices_page,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::INVOICES_VIEW, get(get_invoices_page))
        .route(endpoints::NEW_INVOICE_VIEW, get(get_create_invoice_page))
        .route(endpoints::EDIT_INVOICE_VIEW, get(get_edit_invoice_page))
        .route(endpoints::CUSTOMERS_VIEW, get(get_customers_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are called by HTMX, so they need the HX-REDIRECT header for auth redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::INVOICES_API, post(create_invoice_endpoint))
            .route(
                endpoints::INVOICE_API,
                put(edit_invoice_endpoint).delete(delete_invoice_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::{TestResponse, TestServer};
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        auth::{COOKIE_TOKEN, PasswordHash, ValidatedPassword, create_user},
        customer::insert_customer,
        endpoints,
        invoice::{InvoiceStatus, NewInvoice, insert_invoice},
    };

    use super::build_router;

    const TEST_EMAIL: &str = "user@nextmail.com";
    const TEST_PASSWORD: &str = "123456";

    fn get_test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "42", "Etc/UTC")
            .expect("Could not create app state");

        {
            let connection = state.db_connection.lock().unwrap();
            let password_hash =
                PasswordHash::new(ValidatedPassword::new(TEST_PASSWORD).unwrap(), 4).unwrap();
            create_user(
                "User",
                EmailAddress::new_unchecked(TEST_EMAIL),
                password_hash,
                &connection,
            )
            .unwrap();
            let customer =
                insert_customer("Lee Robinson", "lee@robinson.com", "/lee.png", &connection)
                    .unwrap();
            insert_invoice(
                NewInvoice {
                    customer_id: customer.id,
                    amount: 1000,
                    status: InvoiceStatus::Pending,
                    date: date!(2023 - 06 - 17),
                },
                &connection,
            )
            .unwrap();
        }

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer) -> TestResponse {
        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", TEST_EMAIL), ("password", TEST_PASSWORD)])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        response
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = get_test_server();

        let response = server.get(endpoints::INVOICES_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with(&format!("{}?redirect_url=", endpoints::LOG_IN_VIEW)),
            "got location {location:?}"
        );
    }

    #[tokio::test]
    async fn api_routes_use_hx_redirect_without_cookie() {
        let server = get_test_server();

        let response = server.post(endpoints::INVOICES_API).await;

        response.assert_status_ok();
        assert!(response.maybe_header("hx-redirect").is_some());
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/not/a/real/page")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logged_in_user_can_view_pages() {
        let server = get_test_server();
        let cookie = log_in(&server).await.cookie(COOKIE_TOKEN);

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::INVOICES_VIEW,
            endpoints::NEW_INVOICE_VIEW,
            endpoints::CUSTOMERS_VIEW,
        ] {
            server
                .get(page)
                .add_cookie(cookie.clone())
                .await
                .assert_status_ok();
        }

        server
            .get(&endpoints::format_endpoint(endpoints::EDIT_INVOICE_VIEW, 1))
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();
        server
            .get(&endpoints::format_endpoint(endpoints::EDIT_INVOICE_VIEW, 99))
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logged_in_user_can_create_update_and_delete_invoices() {
        let server = get_test_server();
        let cookie = log_in(&server).await.cookie(COOKIE_TOKEN);

        server
            .post(endpoints::INVOICES_API)
            .add_cookie(cookie.clone())
            .form(&[("customerId", "1"), ("amount", "12.34"), ("status", "paid")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let invoice_url = endpoints::format_endpoint(endpoints::INVOICE_API, 2);
        server
            .put(&invoice_url)
            .add_cookie(cookie.clone())
            .form(&[("customerId", "1"), ("amount", "50"), ("status", "pending")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        server
            .delete(&invoice_url)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        let response = server
            .get(endpoints::INVOICES_VIEW)
            .add_cookie(cookie)
            .await;
        response.assert_status_ok();
        assert!(!response.text().contains("$50.00"));
    }

    #[tokio::test]
    async fn wrong_password_does_not_set_cookie() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("email", TEST_EMAIL), ("password", "wrongpassword")])
            .await;

        response.assert_status_ok();
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
        assert!(response.text().contains("Invalid email or password."));
    }
}
