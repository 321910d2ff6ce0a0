pub mod query;
pub mod sparse_hash;
