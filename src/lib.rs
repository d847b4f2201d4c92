//! narrator-client library crate
//!
//! Async client for the narrator backend: voice cloning, narrator speech synthesis and
//! faceswap video jobs. Every operation is a single request against a configured base URL;
//! responses are mapped into typed models and failures into [`ClientError`].

pub mod api;
pub mod cli;
pub mod models;

pub use api::{ClientConfig, ClientError, Credentials, HttpClient, NarratorApi, RequestOptions};
pub use models::{
    FaceswapInitiation, FaceswapStatus, SpeechAudio, StatusDetails, UploadFile, VoiceId,
};
