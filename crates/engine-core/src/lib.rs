pub mod error;
pub mod paginator;
pub mod service;
