//! Request extractors with improved rejections.
//!
//! Drop-in replacements for the Axum extractors of the same name whose
//! rejections are converted into the server's [`Error`] type.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::validated_json::ValidateJson;
