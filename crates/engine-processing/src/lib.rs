pub mod error;
pub mod health;
pub mod producer;
pub mod retry;
