//! blogicum-server: a personal blog over HTTP
//!
//! Users write posts filed under categories and (optionally) locations,
//! schedule them with a publication date, and comment on each other's posts.
//! Pages are served as JSON page contexts; form submissions redirect.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{BlogConfig, ConfigError};
pub use db::{create_pool, migrate, DbError};
pub use http::{build_router, run_server, AppState, ServerError};
