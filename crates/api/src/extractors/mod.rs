//! Request extractors.

pub mod json;
pub mod local;

pub use json::AppJson;
pub use local::{LOCAL_HEADER, LocalContext};
