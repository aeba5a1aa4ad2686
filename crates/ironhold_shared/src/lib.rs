//! # IRONHOLD Shared
//!
//! Common types used by every IRONHOLD crate.
//!
//! ## CRITICAL RULE
//!
//! This crate holds data only. Transaction logic lives in
//! `ironhold_inventory`, server plumbing in `ironhold_server`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod math;

pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use constants::{
    DEFAULT_EVENT_BUS_CAPACITY, DEFAULT_MAX_ACTIONS, DEFAULT_MAX_REPETITIONS, DEFAULT_MAX_STACK,
};
pub use math::Vec3;
