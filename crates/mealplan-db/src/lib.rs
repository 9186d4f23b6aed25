//! PostgreSQL persistence for meal plans: configuration, pool, migrations,
//! row types and queries.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
