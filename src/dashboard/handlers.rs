//! The dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{
        cards::{CardData, cards_view, fetch_card_data},
        charts::{chart_script, revenue_chart, revenue_chart_view},
        latest_invoices::{LatestInvoice, fetch_latest_invoices, latest_invoices_view},
        revenue::{Revenue, fetch_revenue},
    },
    endpoints,
    html::{HeadElement, base},
    navigation::NavBar,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the cards, the revenue chart and the latest invoices.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let card_data = fetch_card_data(state.db_connection.clone())
        .await
        .inspect_err(|error| tracing::error!("could not get card data: {error}"))?;

    let (revenue, latest_invoices) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let revenue = fetch_revenue(&connection)
            .inspect_err(|error| tracing::error!("could not get revenue: {error}"))?;
        let latest_invoices = fetch_latest_invoices(&connection)
            .inspect_err(|error| tracing::error!("could not get latest invoices: {error}"))?;

        (revenue, latest_invoices)
    };

    Ok(dashboard_view(&card_data, &revenue, &latest_invoices).into_response())
}

fn dashboard_view(
    card_data: &CardData,
    revenue: &[Revenue],
    latest_invoices: &[LatestInvoice],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main
            class="flex flex-col gap-6 px-2 lg:px-6 py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold" { "Dashboard" }

            (cards_view(card_data))

            div class="grid grid-cols-1 gap-6 md:grid-cols-4 lg:grid-cols-8"
            {
                (revenue_chart_view(revenue))

                div class="md:col-span-4"
                {
                    (latest_invoices_view(latest_invoices))
                }
            }
        }
    );

    let scripts = if revenue.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            chart_script(&revenue_chart(revenue).to_string()),
        ]
    };

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        customer::insert_customer,
        dashboard::{Revenue, insert_revenue},
        db::initialize,
        invoice::{InvoiceStatus, NewInvoice, insert_invoice},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state(with_data: bool) -> DashboardState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        if with_data {
            let lee = insert_customer("Lee Robinson", "lee@robinson.com", "/lee.png", &connection)
                .unwrap();
            insert_invoice(
                NewInvoice {
                    customer_id: lee.id,
                    amount: 15795,
                    status: InvoiceStatus::Pending,
                    date: date!(2022 - 12 - 06),
                },
                &connection,
            )
            .unwrap();
            for (month, revenue) in [("Jan", 2000), ("Feb", 1800)] {
                insert_revenue(
                    &Revenue {
                        month: month.to_owned(),
                        revenue,
                    },
                    &connection,
                )
                .unwrap();
            }
        }

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn shows_cards_chart_and_latest_invoices() {
        let response = get_dashboard_page(State(get_test_state(true))).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let cards = document
            .select(&Selector::parse("#cards p").unwrap())
            .map(|card| card.text().collect::<String>().trim().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(cards, ["$0.00", "$157.95", "1", "1"]);

        assert!(
            document
                .select(&Selector::parse("#revenue-chart").unwrap())
                .next()
                .is_some()
        );
        assert_eq!(
            document
                .select(&Selector::parse("[data-latest-invoice]").unwrap())
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn empty_database_shows_no_data() {
        let response = get_dashboard_page(State(get_test_state(false))).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("No data available."));
        assert!(text.contains("No invoices yet."));
    }
}
