pub mod ops;
pub mod search;
