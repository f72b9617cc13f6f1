pub mod backend;
pub mod encoder;
pub mod error;
pub mod exposure;
pub mod function;
pub mod fusion;
pub mod metric;
pub mod query;
pub mod render;
