// ABOUTME: Stream configuration shared by the projector, emitter and pairing engine.
// ABOUTME: Deserializable with defaults and adjustable through builder-style setters.

use serde::{Deserialize, Serialize};

/// Default name given to server-side web search tool blocks.
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

/// Tunables for one streaming call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Capacity of the producer/consumer channel. One keeps the producer at most a
    /// single chunk ahead of the consumer.
    pub channel_capacity: usize,
    /// Inserted before every reasoning summary part except the first.
    pub reasoning_separator: String,
    /// Server tool name used for web search call and result blocks.
    pub web_search_tool_name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
            reasoning_separator: "\n".to_string(),
            web_search_tool_name: WEB_SEARCH_TOOL_NAME.to_string(),
        }
    }
}

impl StreamConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel capacity. Zero is raised to one.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set the separator placed between reasoning summary parts.
    pub fn reasoning_separator(mut self, separator: impl Into<String>) -> Self {
        self.reasoning_separator = separator.into();
        self
    }

    /// Set the server tool name used for web search blocks.
    pub fn web_search_tool_name(mut self, name: impl Into<String>) -> Self {
        self.web_search_tool_name = name.into();
        self
    }

    /// Channel capacity clamped to a value tokio accepts.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}
