// Authentication primitives
// Password hashing, JWT issuing/verification and blacklist maintenance

pub mod blacklist;
pub mod jwt;
pub mod password;
