//! # Flowrate
//!
//! A wallet session and market data client for Starknet perpetuals
//! (Extended Exchange Sepolia testnet).
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `wallet`: Wallet capability interface, provider detection, mock wallet
//! - `session`: Connect/reconnect/disconnect lifecycle and shared session state
//! - `market`: Funding-rate HTTP client and the interval poller
//! - `signing`: Typed-data payload construction and order signing
//! - `persistence`: SQLite-backed reconnect flag
//! - `view`: Read-only view state assembled for a renderer

pub mod config;
pub mod error;
pub mod market;
pub mod persistence;
pub mod session;
pub mod signing;
pub mod view;
pub mod wallet;

pub use config::Config;
pub use error::{Error, Result};
