pub mod parse;
pub mod repository;
pub mod types;
