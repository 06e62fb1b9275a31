//! # Bank
//!
//! Storage layer for the food sharing backend. Every row the service knows
//! about lives here, in one SQLite file.
//!
//! ## Entities
//!
//! - Users, owners of posts and participants in messages/reviews
//! - Categories, small fixed list seeded at install time
//! - Food posts, each with zero or more image paths
//! - Messages between users, optionally about a post
//! - Reviews of one user by another, rating 1 to 5
//!
//!
//!
//! ## Access
//!
//! [`Database`] is a cheap handle. Each operation opens its own connection on
//! the blocking pool so writers contend on SQLite's lock and not on a mutex in
//! this process. That keeps the claim guarantee intact across several server
//! processes sharing the same file.
//!
//!
//!
//! ## Claims
//!
//! See [`claim`]. The only operation with a real concurrency requirement.

pub mod claim;
pub mod database;
pub mod error;
pub mod models;
pub mod schema;

mod categories;
mod messages;
mod posts;
mod reviews;
mod users;

pub use database::Database;
pub use error::BankError;
pub use posts::{MAX_RESULTS, primary_image};
