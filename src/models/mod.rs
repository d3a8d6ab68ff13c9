pub mod equity;
pub mod summary;
