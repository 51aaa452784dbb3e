// Domain types and error definitions

pub mod errors;
pub mod photo;
pub mod user;
