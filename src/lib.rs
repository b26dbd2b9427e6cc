//! Status polling and registry for Pocket Network node operators.

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use error::{CacheError, FetchError, StoreError, ValidationError};
