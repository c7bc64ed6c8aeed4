pub mod db;
pub mod gate;
