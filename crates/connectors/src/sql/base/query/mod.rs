pub mod generator;
pub mod lower;
