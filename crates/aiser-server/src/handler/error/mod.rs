//! [`Error`], [`ErrorKind`] and [`Result`].

mod auth_error;
mod core_error;
mod http_error;

pub use http_error::{Error, ErrorKind, Result};
