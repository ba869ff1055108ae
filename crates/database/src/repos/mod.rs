//! Database repository implementations

pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
pub mod post_repository;
pub mod user_repository;

pub use comment_repository::*;
pub use follow_repository::*;
pub use group_repository::*;
pub use post_repository::*;
pub use user_repository::*;
