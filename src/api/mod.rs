//! Request and response helpers shared by the route handlers

pub mod json;
pub mod response;

pub use json::JsonBody;
pub use response::Created;
