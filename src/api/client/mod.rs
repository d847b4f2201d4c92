//! Client module
//!
//! This module provides HTTP client functionality to interact with the narrator backend.

mod error;
mod http;
mod trait_def;

// Re-export the trait and types
pub use error::{ClientError, Operation};
pub use http::{
    ClientConfig, Credentials, HttpClient, RequestOptions, API_URL_ENV, DEFAULT_BASE_URL,
};
pub use trait_def::NarratorApi;
