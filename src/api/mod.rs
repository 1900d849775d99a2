pub mod catalog;
pub mod client;
pub mod fallback;

pub use catalog::{Catalog, DataSource};
pub use client::{CatalogSource, HttpCatalogSource};
pub use fallback::{fallback_settings, fallback_specialists};
