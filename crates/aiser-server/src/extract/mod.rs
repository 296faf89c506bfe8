//! Request extractors.
//!
//! - [`Json`], [`Path`] and [`ValidateJson`] replace the Axum extractors of
//!   the same name with rejections that render as the server's error body.
//! - [`Authenticated`] runs the [`AuthGate`] against the request headers.
//! - [`MinVersion`] reads the `Min-Aiser-Version` header.
//!
//! [`AuthGate`]: crate::service::AuthGate

mod auth;
mod min_version;
pub mod reject;

pub use crate::extract::auth::Authenticated;
pub use crate::extract::min_version::{MIN_VERSION_HEADER, MinVersion};
pub use crate::extract::reject::{Json, Path, ValidateJson};
