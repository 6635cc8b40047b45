// ABOUTME: Content block types - the vendor-agnostic unit of conversation content,
// ABOUTME: its typed metadata side-table, and the indexed chunk form used while streaming.

use serde::{Deserialize, Serialize};

/// Lifecycle status of the vendor item a block was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Searching,
    Completed,
    Incomplete,
    Failed,
}

/// Typed side-table carried next to every block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_status: Option<ItemStatus>,
}

/// A single unit of conversation content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(flatten)]
    pub content: BlockContent,
    #[serde(default)]
    pub meta: BlockMeta,
}

/// The populated variant of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    AssistantGenText(AssistantGenText),
    Reasoning(Reasoning),
    FunctionToolCall(FunctionToolCall),
    ServerToolCall(ServerToolCall),
    ServerToolResult(ServerToolResult),
    McpToolCall(McpToolCall),
    McpToolResult(McpToolResult),
    McpListToolsResult(McpListToolsResult),
    McpToolApprovalRequest(McpToolApprovalRequest),
    McpToolApprovalResponse(McpToolApprovalResponse),
}

impl BlockContent {
    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockContent::AssistantGenText(_) => "assistant_gen_text",
            BlockContent::Reasoning(_) => "reasoning",
            BlockContent::FunctionToolCall(_) => "function_tool_call",
            BlockContent::ServerToolCall(_) => "server_tool_call",
            BlockContent::ServerToolResult(_) => "server_tool_result",
            BlockContent::McpToolCall(_) => "mcp_tool_call",
            BlockContent::McpToolResult(_) => "mcp_tool_result",
            BlockContent::McpListToolsResult(_) => "mcp_list_tools_result",
            BlockContent::McpToolApprovalRequest(_) => "mcp_tool_approval_request",
            BlockContent::McpToolApprovalResponse(_) => "mcp_tool_approval_response",
        }
    }
}

/// Text generated by the assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantGenText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<TextExtension>,
}

/// Vendor extension attached to generated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextExtension {
    #[serde(default)]
    pub annotations: Vec<TextAnnotation>,
}

/// An annotation together with its position among the block's annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub index: usize,
    pub annotation: Annotation,
}

/// Citation or file reference attached to a span of output text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    UrlCitation {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        start_index: usize,
        #[serde(default)]
        end_index: usize,
    },
    FileCitation {
        file_id: String,
        #[serde(default)]
        filename: String,
        #[serde(default)]
        index: usize,
    },
    ContainerFileCitation {
        container_id: String,
        file_id: String,
        #[serde(default)]
        filename: String,
        #[serde(default)]
        start_index: usize,
        #[serde(default)]
        end_index: usize,
    },
    FilePath {
        file_id: String,
        #[serde(default)]
        index: usize,
    },
}

/// Reasoning produced by the model, as a joined text plus its summary parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<ReasoningSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
}

/// One reasoning summary part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningSummary {
    pub index: usize,
    pub text: String,
}

/// A call to a function tool defined by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub call_id: String,
    pub name: String,
    /// Raw JSON argument text, possibly partial while streaming.
    pub arguments: String,
}

/// A call to a tool executed by the vendor (e.g. web search).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerToolCall {
    pub name: String,
    pub call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

/// The result of a vendor-executed tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerToolResult {
    pub name: String,
    pub call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// A call to a tool on a remote MCP server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolCall {
    pub server_label: String,
    pub call_id: String,
    pub name: String,
    pub arguments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_request_id: Option<String>,
}

/// The output of a remote MCP tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    pub call_id: String,
    pub name: String,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tools advertised by a remote MCP server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpListToolsResult {
    pub server_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<McpToolSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One tool advertised by an MCP server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

/// A request for the user to approve an MCP tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolApprovalRequest {
    pub id: String,
    pub server_label: String,
    pub name: String,
    pub arguments: String,
}

/// The user's answer to an approval request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolApprovalResponse {
    pub approval_request_id: String,
    pub approve: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

macro_rules! impl_block_content_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for BlockContent {
                fn from(value: $variant) -> Self {
                    BlockContent::$variant(value)
                }
            }
        )*
    };
}

impl_block_content_from!(
    AssistantGenText,
    Reasoning,
    FunctionToolCall,
    ServerToolCall,
    ServerToolResult,
    McpToolCall,
    McpToolResult,
    McpListToolsResult,
    McpToolApprovalRequest,
    McpToolApprovalResponse,
);

impl ContentBlock {
    /// Create a block with empty metadata.
    pub fn new(content: impl Into<BlockContent>) -> Self {
        Self {
            content: content.into(),
            meta: BlockMeta::default(),
        }
    }

    /// Create an assistant text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(AssistantGenText {
            text: text.into(),
            extension: None,
        })
    }

    /// Set the originating item id. Empty ids are not recorded.
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        let item_id = item_id.into();
        self.meta.item_id = if item_id.is_empty() { None } else { Some(item_id) };
        self
    }

    /// Set the originating item status.
    pub fn with_status(mut self, status: impl Into<Option<ItemStatus>>) -> Self {
        self.meta.item_status = status.into();
        self
    }

    /// Attach a stream index, turning the block into a chunk.
    pub fn at(self, index: usize) -> ContentBlockChunk {
        ContentBlockChunk {
            block: self,
            streaming_meta: StreamingMeta { index },
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        self.meta.item_id.as_deref()
    }

    pub fn status(&self) -> Option<ItemStatus> {
        self.meta.item_status
    }
}

/// Position of a chunk within the final assembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingMeta {
    pub index: usize,
}

/// A fragment of a content block. Chunks sharing an index merge into one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlockChunk {
    pub block: ContentBlock,
    pub streaming_meta: StreamingMeta,
}

impl ContentBlockChunk {
    pub fn index(&self) -> usize {
        self.streaming_meta.index
    }
}
