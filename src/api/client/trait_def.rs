//! Client trait definition
//!
//! This module defines the `NarratorApi` trait that abstracts over client implementations,
//! so callers can be handed a test double instead of a real HTTP client.

use super::ClientError;
use crate::models::{FaceswapInitiation, FaceswapStatus, SpeechAudio, UploadFile, VoiceId};

/// Trait defining the remote operations of the narrator backend
#[async_trait::async_trait]
pub trait NarratorApi: Send + Sync {
    /// Upload a voice sample and clone it, returning the new voice id
    async fn clone_voice(&self, audio: UploadFile) -> Result<VoiceId, ClientError>;

    /// Start a faceswap job for the given photo
    async fn initiate_faceswap(&self, photo: UploadFile)
        -> Result<FaceswapInitiation, ClientError>;

    /// Fetch the current status of a faceswap task
    async fn get_faceswap_status(&self, task_id: &str) -> Result<FaceswapStatus, ClientError>;

    /// Synthesize `text` with a previously cloned voice
    async fn synthesize_narrator_speech(
        &self,
        text: &str,
        voice_id: &VoiceId,
    ) -> Result<SpeechAudio, ClientError>;
}
