// Domain layer module exports
// Entities, validation rules and repository ports; no HTTP or SQL here

pub mod company;
pub mod document;
pub mod ipo;
pub mod repositories;
pub mod user;
pub mod validation;
