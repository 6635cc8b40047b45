// ABOUTME: Incremental stream events emitted by a Responses-style vendor API.
// ABOUTME: A closed union; anything outside it decodes as Unknown and is fatal.

use serde::{Deserialize, Serialize};

use super::{OutputContent, OutputItem, ResponseObject};
use crate::error::{Error, ProtocolError};
use crate::schema::Annotation;

/// Position of an event that only needs to be recognized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPosition {
    pub item_id: String,
    pub output_index: usize,
}

/// One event of a streamed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseStreamEvent {
    #[serde(rename = "response.created")]
    Created { response: ResponseObject },
    #[serde(rename = "response.queued")]
    Queued { response: ResponseObject },
    #[serde(rename = "response.in_progress")]
    InProgress { response: ResponseObject },
    #[serde(rename = "response.completed")]
    Completed { response: ResponseObject },
    #[serde(rename = "response.incomplete")]
    Incomplete { response: ResponseObject },
    #[serde(rename = "response.failed")]
    Failed { response: ResponseObject },

    #[serde(rename = "response.output_item.added")]
    OutputItemAdded { output_index: usize, item: OutputItem },
    #[serde(rename = "response.output_item.done")]
    OutputItemDone { output_index: usize, item: OutputItem },

    #[serde(rename = "response.content_part.added")]
    ContentPartAdded {
        item_id: String,
        output_index: usize,
        content_index: usize,
        part: OutputContent,
    },
    #[serde(rename = "response.content_part.done")]
    ContentPartDone {
        item_id: String,
        output_index: usize,
        content_index: usize,
        part: OutputContent,
    },

    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        item_id: String,
        output_index: usize,
        content_index: usize,
        delta: String,
    },
    #[serde(rename = "response.refusal.delta")]
    RefusalDelta {
        item_id: String,
        output_index: usize,
        content_index: usize,
        delta: String,
    },
    #[serde(rename = "response.output_text.annotation.added")]
    OutputTextAnnotationAdded {
        item_id: String,
        output_index: usize,
        content_index: usize,
        annotation_index: usize,
        annotation: Annotation,
    },

    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        item_id: String,
        output_index: usize,
        delta: String,
    },
    #[serde(rename = "response.mcp_call_arguments.delta")]
    McpCallArgumentsDelta {
        item_id: String,
        output_index: usize,
        delta: String,
    },
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta {
        item_id: String,
        output_index: usize,
        summary_index: usize,
        delta: String,
    },

    #[serde(rename = "response.mcp_call.in_progress")]
    McpCallInProgress(EventPosition),
    #[serde(rename = "response.mcp_call.completed")]
    McpCallCompleted(EventPosition),
    #[serde(rename = "response.mcp_call.failed")]
    McpCallFailed(EventPosition),
    #[serde(rename = "response.mcp_list_tools.in_progress")]
    McpListToolsInProgress(EventPosition),
    #[serde(rename = "response.mcp_list_tools.completed")]
    McpListToolsCompleted(EventPosition),
    #[serde(rename = "response.mcp_list_tools.failed")]
    McpListToolsFailed(EventPosition),
    #[serde(rename = "response.web_search_call.in_progress")]
    WebSearchCallInProgress(EventPosition),
    #[serde(rename = "response.web_search_call.searching")]
    WebSearchCallSearching(EventPosition),
    #[serde(rename = "response.web_search_call.completed")]
    WebSearchCallCompleted(EventPosition),

    #[serde(rename = "response.output_text.done")]
    OutputTextDone(EventPosition),
    #[serde(rename = "response.refusal.done")]
    RefusalDone(EventPosition),
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone(EventPosition),
    #[serde(rename = "response.mcp_call_arguments.done")]
    McpCallArgumentsDone(EventPosition),
    #[serde(rename = "response.reasoning_summary_part.added")]
    ReasoningSummaryPartAdded(EventPosition),
    #[serde(rename = "response.reasoning_summary_part.done")]
    ReasoningSummaryPartDone(EventPosition),
    #[serde(rename = "response.reasoning_summary_text.done")]
    ReasoningSummaryTextDone(EventPosition),

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: String,
    },

    #[serde(other)]
    Unknown,
}

impl ResponseStreamEvent {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "response.created",
            Self::Queued { .. } => "response.queued",
            Self::InProgress { .. } => "response.in_progress",
            Self::Completed { .. } => "response.completed",
            Self::Incomplete { .. } => "response.incomplete",
            Self::Failed { .. } => "response.failed",
            Self::OutputItemAdded { .. } => "response.output_item.added",
            Self::OutputItemDone { .. } => "response.output_item.done",
            Self::ContentPartAdded { .. } => "response.content_part.added",
            Self::ContentPartDone { .. } => "response.content_part.done",
            Self::OutputTextDelta { .. } => "response.output_text.delta",
            Self::RefusalDelta { .. } => "response.refusal.delta",
            Self::OutputTextAnnotationAdded { .. } => "response.output_text.annotation.added",
            Self::FunctionCallArgumentsDelta { .. } => "response.function_call_arguments.delta",
            Self::McpCallArgumentsDelta { .. } => "response.mcp_call_arguments.delta",
            Self::ReasoningSummaryTextDelta { .. } => "response.reasoning_summary_text.delta",
            Self::McpCallInProgress(_) => "response.mcp_call.in_progress",
            Self::McpCallCompleted(_) => "response.mcp_call.completed",
            Self::McpCallFailed(_) => "response.mcp_call.failed",
            Self::McpListToolsInProgress(_) => "response.mcp_list_tools.in_progress",
            Self::McpListToolsCompleted(_) => "response.mcp_list_tools.completed",
            Self::McpListToolsFailed(_) => "response.mcp_list_tools.failed",
            Self::WebSearchCallInProgress(_) => "response.web_search_call.in_progress",
            Self::WebSearchCallSearching(_) => "response.web_search_call.searching",
            Self::WebSearchCallCompleted(_) => "response.web_search_call.completed",
            Self::OutputTextDone(_) => "response.output_text.done",
            Self::RefusalDone(_) => "response.refusal.done",
            Self::FunctionCallArgumentsDone(_) => "response.function_call_arguments.done",
            Self::McpCallArgumentsDone(_) => "response.mcp_call_arguments.done",
            Self::ReasoningSummaryPartAdded(_) => "response.reasoning_summary_part.added",
            Self::ReasoningSummaryPartDone(_) => "response.reasoning_summary_part.done",
            Self::ReasoningSummaryTextDone(_) => "response.reasoning_summary_text.done",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Decode one JSON event payload (the `data` of an SSE frame).
///
/// An event whose `type` is not part of the recognized set fails with
/// [`ProtocolError::UnrecognizedEvent`] naming that type.
pub fn decode_event(data: &str) -> Result<ResponseStreamEvent, Error> {
    let event: ResponseStreamEvent = serde_json::from_str(data)?;
    if let ResponseStreamEvent::Unknown = event {
        let raw: serde_json::Value = serde_json::from_str(data)?;
        let kind = raw
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ProtocolError::UnrecognizedEvent(kind).into());
    }
    Ok(event)
}
