//! Maintenance portal core — request lifecycle engine, query/filter layer,
//! and the relational entity store behind them.

pub mod api;
pub mod auth;
pub mod entity;
pub mod lifecycle;
