//! Derived statistics over fetched bar series.
//!
//! This crate is a pure computation layer: it takes a
//! [`Series`](market_data_fetcher::models::series::Series) produced by a
//! provider and derives per-bar log returns, rolling annualized volatility,
//! and rolling mean return. It performs no I/O and holds no state, so the
//! same input always yields the same output.

pub mod errors;
pub mod rolling;
pub mod volatility;
