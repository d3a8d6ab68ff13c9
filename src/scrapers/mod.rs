pub mod base;
pub mod iex;
