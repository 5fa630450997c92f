pub mod cache;
pub mod seed;
