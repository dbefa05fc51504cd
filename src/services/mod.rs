//! Service layer modules.
//!
//! Resource services over the record store, plus the optional Redis cache.

pub mod cache;
pub mod items;
pub mod profiles;

pub use cache::{ProfileCache, RedisCache};
pub use items::ItemService;
pub use profiles::ProfileService;
