//! Street geometry service.
//!
//! Streets are named polylines stored in SQLite. The interesting part is
//! [`ops`]: adding a point to either end of a street's geometry through one of
//! two strategies chosen at runtime by [`config::FeatureFlags`].

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ops;
pub mod store;
