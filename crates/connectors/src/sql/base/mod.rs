pub mod adapter;
pub mod error;
pub mod macros;
pub mod query;
pub mod row;
