//! nestreq - nested-parameter HTTP requests
//!
//! This crate assembles HTTP requests from nested parameter trees, flattening
//! them into bracket-notation query and form keys, and sends them through a
//! pluggable transport with per-request cancellation.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod observer;
pub mod params;
pub mod utils;

pub use config::{HttpMethod, ProxyConfig, RequestConfig, RequestSpec, TransportConfig};
pub use error::{RequestError, Result};
pub use http::{Request, RequestState};
pub use params::{flatten, ParamValue, Params, Scalar};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
