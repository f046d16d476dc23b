pub mod auth;
pub mod companies;
pub mod documents;
pub mod ipos;
pub mod listings;
