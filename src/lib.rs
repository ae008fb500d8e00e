//! Building energy model parameter resolution and batch model generation.
//!
//! A static [`catalog`] of parameter ranges per building classification and
//! tier is combined with a user override document ([`user_config`]) by the
//! [`resolver`]; [`preprocess`] flattens the result per building, and
//! [`batch`] generates one model per building on a bounded worker pool.

#[cfg(feature = "api")]
pub mod api;
pub mod batch;
pub mod building;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod ground;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod resolver;
pub mod sampler;
pub mod simulate;
pub mod store;
pub mod user_config;

pub use error::{Error, Result};
