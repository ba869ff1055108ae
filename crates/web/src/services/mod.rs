pub mod error;
pub mod follow;
pub mod posts;
