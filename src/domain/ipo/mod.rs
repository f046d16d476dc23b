// IPO domain module
// Contains the IPO entity, its input validation and status value object

#![allow(clippy::module_inception)]

pub mod ipo;
pub mod value_objects;

// Re-export main types for convenience
pub use ipo::{Ipo, IpoDetails, IpoInput, NewIpo};
pub use value_objects::IpoStatus;
