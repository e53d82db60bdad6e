mod errors;
mod patron_service;

pub use errors::{PatronError, Result};
pub use patron_service::{
    ServiceDependencies, borrow_item, borrowed_items, download_item, fetch_item, return_item,
};
