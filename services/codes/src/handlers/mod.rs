pub mod code;
pub mod operator;
pub mod usage;
