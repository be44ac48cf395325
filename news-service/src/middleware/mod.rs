//! Request extractors shared by the route handlers.

pub mod body;
pub mod secret;

pub use body::{FormParams, JsonBody};
pub use secret::{RequireSecret, SECRET_HEADER};
