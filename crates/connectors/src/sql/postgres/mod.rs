pub mod adapter;
pub mod utils;
