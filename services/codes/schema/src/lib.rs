//! sea-orm entities for the codes service.

pub mod codes;
pub mod users;
