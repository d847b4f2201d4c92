//! HTTP client implementation
//!
//! This module provides the reqwest-backed implementation of `NarratorApi`.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde_json::Value;

use super::error::{remote_error, Operation};
use super::{ClientError, NarratorApi};
use crate::models::{
    FaceswapInitiation, FaceswapStatus, NarratorSpeechRequest, SpeechAudio, UploadFile, VoiceId,
};

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "NARRATOR_API_URL";

/// Base URL of a local development backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Whether session cookies travel with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Send the session cookies and store the ones the backend sets
    #[default]
    Include,
    /// Neither send nor store cookies
    Omit,
}

/// API client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads the base URL from `NARRATOR_API_URL`, falling back to the local default
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Per-request overrides of the client configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    pub credentials: Option<Credentials>,
}

impl RequestOptions {
    pub fn credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }
}

/// Parses and validates the base URL once, at construction time
fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url)
        .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL {base_url:?}: {e}")))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidConfig(format!(
            "base URL {base_url:?} must be an http(s) URL"
        )));
    }

    Ok(url)
}

fn file_part(file: UploadFile) -> Result<Part, ClientError> {
    let (file_name, content_type, data) = file.into_parts();
    let part = Part::bytes(data.to_vec()).file_name(file_name);

    match content_type {
        Some(content_type) => part.mime_str(&content_type).map_err(|e| {
            ClientError::InvalidArgument(format!("invalid content type {content_type:?}: {e}"))
        }),
        None => Ok(part),
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}

/// HTTP client for the narrator backend.
///
/// Requests with credentials go through a client wired to the session cookie jar, so
/// cookies are sent and stored on every hop of a redirect chain. Requests without
/// credentials use a second client that never sees the jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    session_client: Arc<ReqwestClient>,
    http_client: Arc<ReqwestClient>,
    base_url: Url,
    credentials: Credentials,
    cookies: Arc<Jar>,
}

impl HttpClient {
    /// Create a new client configured from the environment
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;
        let cookies = Arc::new(Jar::default());
        let session_client = ReqwestClient::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        let http_client = ReqwestClient::builder().build()?;

        Ok(Self {
            session_client: Arc::new(session_client),
            http_client: Arc::new(http_client),
            base_url,
            credentials: config.credentials,
            cookies,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Seeds the session with a cookie, given in `Set-Cookie` syntax (e.g. `session=abc`)
    pub fn add_session_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base_url);
    }

    /// The session cookies that would be sent to the backend, as a `Cookie` header value
    pub fn session_cookies(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Builds the URL of an endpoint below the base URL, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The base URL was checked to be a base in `parse_base_url`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn effective_credentials(&self, options: RequestOptions) -> Credentials {
        options.credentials.unwrap_or(self.credentials)
    }

    fn request(&self, method: Method, url: &Url, credentials: Credentials) -> RequestBuilder {
        let client = match credentials {
            Credentials::Include => &self.session_client,
            Credentials::Omit => &self.http_client,
        };
        client.request(method, url.clone())
    }

    /// Sends a request, turning non-2xx statuses into errors
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<Response, ClientError> {
        tracing::debug!(operation = operation.name(), "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(operation = operation.name(), "Request failed: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!(
            operation = operation.name(),
            status = status.as_u16(),
            "Received response"
        );

        if status.is_success() {
            return Ok(response);
        }

        // An unreadable error body is handled like an unparseable one
        let body = response.bytes().await.unwrap_or_default();
        let error = remote_error(operation, status, &body);
        tracing::warn!(
            operation = operation.name(),
            status = status.as_u16(),
            "Backend returned an error: {}",
            error
        );
        Err(error)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> Result<T, ClientError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(operation = operation.name(), "Invalid response body: {}", e);
            ClientError::MalformedResponse(format!(
                "invalid {} response body: {}",
                operation.name(),
                e
            ))
        })
    }

    /// Upload a voice sample and clone it
    pub async fn clone_voice_with(
        &self,
        audio: UploadFile,
        options: RequestOptions,
    ) -> Result<VoiceId, ClientError> {
        let operation = Operation::CloneVoice;
        let credentials = self.effective_credentials(options);
        let url = self.endpoint(&["api", "clone-voice"]);
        let form = Form::new().part("audio_file", file_part(audio)?);

        let request = self.request(Method::POST, &url, credentials).multipart(form);
        let response = self.send(operation, request).await?;

        let body = response.bytes().await?;
        let voice_id = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|value| match value.get("voice_id") {
                Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                _ => None,
            });

        match voice_id {
            Some(id) => Ok(VoiceId::new(id)),
            None => {
                tracing::warn!(
                    operation = operation.name(),
                    "Voice ID missing in response: {}",
                    String::from_utf8_lossy(&body)
                );
                Err(ClientError::MalformedResponse(
                    "Voice ID not found in clone response".to_string(),
                ))
            }
        }
    }

    /// Start a faceswap job for the given photo
    pub async fn initiate_faceswap_with(
        &self,
        photo: UploadFile,
        options: RequestOptions,
    ) -> Result<FaceswapInitiation, ClientError> {
        let operation = Operation::InitiateFaceswap;
        let credentials = self.effective_credentials(options);
        let url = self.endpoint(&["api", "initiate-faceswap"]);
        let form = Form::new().part("user_image", file_part(photo)?);

        let request = self.request(Method::POST, &url, credentials).multipart(form);
        let response = self.send(operation, request).await?;
        Self::read_json(operation, response).await
    }

    /// Fetch the current status of a faceswap task
    pub async fn get_faceswap_status_with(
        &self,
        task_id: &str,
        options: RequestOptions,
    ) -> Result<FaceswapStatus, ClientError> {
        require_non_empty(task_id, "task id")?;

        let operation = Operation::FaceswapStatus;
        let credentials = self.effective_credentials(options);
        let url = self.endpoint(&["api", "faceswap-status", task_id]);

        let request = self.request(Method::GET, &url, credentials);
        let response = self.send(operation, request).await?;
        Self::read_json(operation, response).await
    }

    /// Synthesize `text` with a previously cloned voice
    pub async fn synthesize_narrator_speech_with(
        &self,
        text: &str,
        voice_id: &VoiceId,
        options: RequestOptions,
    ) -> Result<SpeechAudio, ClientError> {
        require_non_empty(text, "text")?;
        require_non_empty(voice_id.as_str(), "voice id")?;

        let operation = Operation::NarratorSpeech;
        let credentials = self.effective_credentials(options);
        let url = self.endpoint(&["api", "generate-narrator-speech"]);
        let body = NarratorSpeechRequest {
            text,
            voice_id: voice_id.as_str(),
        };

        let request = self.request(Method::POST, &url, credentials).json(&body);
        let response = self.send(operation, request).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?;

        SpeechAudio::from_payload(data, content_type).ok_or_else(|| {
            tracing::warn!(
                operation = operation.name(),
                "Narrator speech response is empty"
            );
            ClientError::EmptyPayload
        })
    }
}

#[async_trait::async_trait]
impl NarratorApi for HttpClient {
    async fn clone_voice(&self, audio: UploadFile) -> Result<VoiceId, ClientError> {
        self.clone_voice_with(audio, RequestOptions::default()).await
    }

    async fn initiate_faceswap(
        &self,
        photo: UploadFile,
    ) -> Result<FaceswapInitiation, ClientError> {
        self.initiate_faceswap_with(photo, RequestOptions::default())
            .await
    }

    async fn get_faceswap_status(&self, task_id: &str) -> Result<FaceswapStatus, ClientError> {
        self.get_faceswap_status_with(task_id, RequestOptions::default())
            .await
    }

    async fn synthesize_narrator_speech(
        &self,
        text: &str,
        voice_id: &VoiceId,
    ) -> Result<SpeechAudio, ClientError> {
        self.synthesize_narrator_speech_with(text, voice_id, RequestOptions::default())
            .await
    }
}
