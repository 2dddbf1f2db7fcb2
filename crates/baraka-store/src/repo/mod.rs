pub mod customers;

pub use customers::{CustomerNew, CustomersRepo};
