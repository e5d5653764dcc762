//! Customers that invoices are billed to.

mod core;
mod customers_page;

pub use core::{
    Customer, CustomerField, CustomerId, create_customer_table, fetch_customers, insert_customer,
};
pub use customers_page::get_customers_page;
