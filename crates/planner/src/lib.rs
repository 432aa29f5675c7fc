pub mod alias;
pub mod assemble;
pub mod error;
pub mod filter;
pub mod join;
pub mod ordering;
pub mod params;
pub mod plan;
pub mod query;
pub mod repository;
pub mod resolve;
