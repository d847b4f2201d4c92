//! API module
//!
//! This module provides the remote API of the narrator backend: the client trait,
//! its HTTP implementation and the error taxonomy.

pub mod client;

// Re-export commonly used types
pub use client::{
    ClientConfig, ClientError, Credentials, HttpClient, NarratorApi, RequestOptions,
};
