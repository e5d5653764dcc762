//! Invoices: the table, the create and edit forms, and the endpoints behind them.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod invoices_page;
mod query;

pub use core::{
    InvoiceId, InvoiceStatus, MAX_AMOUNT, NewInvoice, create_invoice_table, insert_invoice,
};
pub use create::{create_invoice_endpoint, get_create_invoice_page};
pub use delete::delete_invoice_endpoint;
pub use edit::{edit_invoice_endpoint, get_edit_invoice_page};
pub use invoices_page::get_invoices_page;
