//! IPO Listings API Library
//!
//! Companies, their IPOs and disclosure documents behind a JWT-authenticated
//! HTTP API, with PostgreSQL and in-memory storage adapters.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
