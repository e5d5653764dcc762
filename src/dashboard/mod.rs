//! The dashboard: summary cards, the revenue chart and the latest invoices.

mod cards;
mod charts;
mod handlers;
mod latest_invoices;
mod revenue;

pub use handlers::get_dashboard_page;
pub use revenue::{Revenue, create_revenue_table, insert_revenue};
