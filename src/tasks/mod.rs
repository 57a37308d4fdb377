pub mod data;
pub mod repo;
pub mod sync;
