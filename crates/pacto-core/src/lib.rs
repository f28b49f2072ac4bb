//! # pacto-core
//!
//! Core types, traits, configuration, and error handling for the Pacto agent.

pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod normalize;
pub mod traits;

pub use config::shellexpand;
