pub mod batch;
pub mod event;
pub mod row;
