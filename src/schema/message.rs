// ABOUTME: Conversation message and response metadata types, plus the
// ABOUTME: outbound stream chunk that carries either a block fragment or metadata.

use serde::{Deserialize, Serialize};

use super::{BlockContent, ContentBlock, ContentBlockChunk};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Overall status of a vendor response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Completed,
    Incomplete,
    Failed,
    Cancelled,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    #[serde(default)]
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default)]
    pub reasoning_tokens: u64,
    pub total_tokens: u64,
}

/// Error reported by the vendor for a failed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
}

/// Why a response ended before completing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteDetails {
    pub reason: String,
}

/// Vendor-level description of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseExtension {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<IncompleteDetails>,
}

/// Metadata attached to a finished message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<ResponseExtension>,
}

/// A conversation message made of complete blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_meta: Option<ResponseMeta>,
}

impl Message {
    /// Create an assistant message from complete blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            response_meta: None,
        }
    }

    /// Attach response metadata.
    pub fn with_response_meta(mut self, meta: ResponseMeta) -> Self {
        self.response_meta = Some(meta);
        self
    }

    /// Concatenated assistant text.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match &b.content {
                BlockContent::AssistantGenText(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Concatenated reasoning text.
    pub fn reasoning_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match &b.content {
                BlockContent::Reasoning(r) => Some(r.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Token usage, if the vendor reported it.
    pub fn usage(&self) -> Option<&TokenUsage> {
        self.response_meta.as_ref()?.usage.as_ref()
    }
}

/// One item of an outbound chunk stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamChunk {
    Block(ContentBlockChunk),
    Meta(ResponseMeta),
}

impl StreamChunk {
    /// The block chunk, if this is one.
    pub fn as_block(&self) -> Option<&ContentBlockChunk> {
        match self {
            StreamChunk::Block(chunk) => Some(chunk),
            StreamChunk::Meta(_) => None,
        }
    }

    /// The metadata, if this is a metadata chunk.
    pub fn as_meta(&self) -> Option<&ResponseMeta> {
        match self {
            StreamChunk::Meta(meta) => Some(meta),
            StreamChunk::Block(_) => None,
        }
    }
}

impl From<ContentBlockChunk> for StreamChunk {
    fn from(chunk: ContentBlockChunk) -> Self {
        StreamChunk::Block(chunk)
    }
}
