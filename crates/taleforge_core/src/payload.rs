//! Transient provider results.

use taleforge_error::ProviderError;

/// Body of a successful provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadBody {
    /// Generated text (the text artifact kind)
    Text(String),
    /// Raw binary content (image, audio, video)
    Binary(Vec<u8>),
}

impl PayloadBody {
    /// Byte length of the payload.
    pub fn len(&self) -> usize {
        match self {
            PayloadBody::Text(t) => t.len(),
            PayloadBody::Binary(b) => b.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The payload as bytes, borrowed.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PayloadBody::Text(t) => t.as_bytes(),
            PayloadBody::Binary(b) => b,
        }
    }
}

/// A successful provider response: content plus its MIME type.
///
/// Not persisted independently; the orchestrator hands it to the artifact
/// store immediately and discards it.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new, derive_getters::Getters)]
pub struct ProviderPayload {
    /// Generated content
    body: PayloadBody,
    /// MIME type reported by the provider (e.g. "image/png")
    content_type: String,
}

impl ProviderPayload {
    /// Convenience constructor for text payloads.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(PayloadBody::Text(text.into()), "text/plain".to_string())
    }

    /// Convenience constructor for binary payloads.
    pub fn binary(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::new(PayloadBody::Binary(bytes), content_type.into())
    }
}

/// Outcome of one provider call: payload or classified failure.
pub type ProviderResult = Result<ProviderPayload, ProviderError>;
