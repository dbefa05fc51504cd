//! Domain types and DTOs
//!
//! Record shapes, request bodies and the validation rules applied to them.

pub mod items;
pub mod profiles;
pub mod validation;

pub use profiles::{CreateProfileRequest, Profile, UpdateProfileRequest};
