//! Data models for the narrator backend
//!
//! This module contains the request and response types exchanged with the backend.
//! All identifiers are opaque: the client passes them through without interpreting them.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// File name used for voice recordings when the caller does not provide one
pub const DEFAULT_VOICE_FILE_NAME: &str = "user_voice.webm";

/// Opaque identifier of a cloned voice
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for VoiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for VoiceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A file sent as one part of a multipart upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadFile {
    /// Creates an upload with no explicit content type
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Wraps a browser-style voice recording under the default file name
    pub fn voice_recording(data: impl Into<Bytes>) -> Self {
        Self::new(DEFAULT_VOICE_FILE_NAME, data).with_content_type("audio/webm")
    }

    /// Reads a file from disk, guessing its content type from the extension.
    ///
    /// The upload is named after the file; a path without a file name is rejected.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;
        let data = tokio::fs::read(path).await?;

        let upload = Self::new(file_name, data);
        Ok(match guess_content_type(path) {
            Some(content_type) => upload.with_content_type(content_type),
            None => upload,
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Splits the upload into file name, content type and data
    pub fn into_parts(self) -> (String, Option<String>, Bytes) {
        (self.file_name, self.content_type, self.data)
    }
}

/// Maps the common audio and image extensions to a MIME type
fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "webm" => "audio/webm",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(content_type)
}

/// Response of the faceswap initiation endpoint.
///
/// The backend may answer with only a message, so every identifier is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceswapInitiation {
    #[serde(rename = "akool_task_id", default)]
    pub task_id: Option<String>,
    #[serde(rename = "akool_job_id", default)]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_url: Option<String>,
}

/// Current state of a faceswap task as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceswapStatus {
    pub task_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_details: StatusDetails,
}

/// Whatever the backend currently knows about a faceswap task.
///
/// No set of states is assumed. A known key whose value has an unexpected type is
/// kept in `extra` under its wire name, next to every unknown key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct StatusDetails {
    /// `faceswap_status` on the wire; any JSON number
    pub status_code: Option<Number>,
    pub url: Option<String>,
    /// `msg` on the wire
    pub message: Option<String>,
    /// `_id` on the wire
    pub record_id: Option<String>,
    pub extra: Map<String, Value>,
}

const STATUS_CODE_KEY: &str = "faceswap_status";
const URL_KEY: &str = "url";
const MESSAGE_KEY: &str = "msg";
const RECORD_ID_KEY: &str = "_id";

impl From<Map<String, Value>> for StatusDetails {
    fn from(mut extra: Map<String, Value>) -> Self {
        let status_code = take_if(&mut extra, STATUS_CODE_KEY, |value| match value {
            Value::Number(number) => Ok(number),
            other => Err(other),
        });
        let url = take_if(&mut extra, URL_KEY, string_value);
        let message = take_if(&mut extra, MESSAGE_KEY, string_value);
        let record_id = take_if(&mut extra, RECORD_ID_KEY, string_value);

        Self {
            status_code,
            url,
            message,
            record_id,
            extra,
        }
    }
}

impl From<StatusDetails> for Map<String, Value> {
    fn from(details: StatusDetails) -> Self {
        let mut map = details.extra;
        if let Some(code) = details.status_code {
            map.insert(STATUS_CODE_KEY.to_string(), Value::Number(code));
        }
        let strings = [
            (URL_KEY, details.url),
            (MESSAGE_KEY, details.message),
            (RECORD_ID_KEY, details.record_id),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value));
            }
        }
        map
    }
}

fn string_value(value: Value) -> Result<String, Value> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(other),
    }
}

/// Removes `key` from `map` when `convert` accepts its value.
///
/// `null` is dropped; a rejected value is put back untouched.
fn take_if<T>(
    map: &mut Map<String, Value>,
    key: &str,
    convert: impl FnOnce(Value) -> Result<T, Value>,
) -> Option<T> {
    match map.remove(key)? {
        Value::Null => None,
        value => match convert(value) {
            Ok(converted) => Some(converted),
            Err(value) => {
                map.insert(key.to_string(), value);
                None
            }
        },
    }
}

/// Deserializes `null` the same way as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a narrator speech request
#[derive(Debug, Clone, Serialize)]
pub struct NarratorSpeechRequest<'a> {
    pub text: &'a str,
    pub voice_id: &'a str,
}

/// Synthesized narrator audio held in memory.
///
/// Owned by the caller once returned; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    data: Bytes,
    content_type: Option<String>,
}

impl SpeechAudio {
    /// Wraps a received payload, refusing an empty one
    pub(crate) fn from_payload(data: Bytes, content_type: Option<String>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self { data, content_type })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    // Always false for a value produced by the client
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the audio to `path`, replacing any existing file
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, &self.data).await
    }
}
