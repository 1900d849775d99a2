pub mod api;
pub mod app;
pub mod consultation;
pub mod error;
pub mod platform;

pub use error::{Error, Result};
