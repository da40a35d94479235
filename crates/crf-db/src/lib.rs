//! # crf-db
//!
//! Database layer for the course request form.
//!
//! - Connection pool management and embedded migrations
//! - Store traits for users and requests, with PostgreSQL repositories
//!
//! ## Example
//!
//! ```ignore
//! use crf_db::{Database, RequestRepository, RequestStore};
//!
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//!
//! let repo = RequestRepository::new(db.pool().clone());
//! let request = repo.find_by_id(1).await?;
//! ```

pub mod pool;
pub mod repository;
pub mod requests;
pub mod users;

pub use pool::{Database, PoolStats};
pub use repository::{Pagination, RepositoryError, RepositoryResult};
pub use requests::{RequestRepository, RequestRow, RequestStore};
pub use users::{UserRepository, UserRow, UserStore};

#[cfg(any(test, feature = "mock"))]
pub use requests::MockRequestStore;
#[cfg(any(test, feature = "mock"))]
pub use users::MockUserStore;
