// ABOUTME: Per-item-kind mapping from finished vendor items to content blocks.
// ABOUTME: Shared by the streaming "item done" branch and the non-streaming path.

use crate::error::{Error, ProtocolError};
use crate::schema::{
    Annotation, AssistantGenText, ContentBlock, FunctionToolCall, ItemStatus, McpListToolsResult,
    McpToolApprovalRequest, McpToolApprovalResponse, McpToolCall, McpToolResult, Reasoning,
    ReasoningSummary, ResponseExtension, ResponseMeta, ServerToolCall, ServerToolResult,
    TextAnnotation, TextExtension, TokenUsage,
};
use crate::wire::{
    FunctionCallItem, McpApprovalRequestItem, McpApprovalResponseItem, McpCallItem,
    McpListToolsItem, MessageItem, OutputContent, ReasoningItem, ResponseObject,
    WebSearchAction, WebSearchCallItem, WireUsage,
};

/// Response metadata carried by a lifecycle event or a complete response.
pub(crate) fn response_meta(response: &ResponseObject) -> ResponseMeta {
    ResponseMeta {
        usage: response.usage.as_ref().map(token_usage),
        extension: Some(ResponseExtension {
            id: response.id.clone(),
            status: response.status,
            model: response.model.clone(),
            created_at: response.created_at,
            previous_response_id: response.previous_response_id.clone(),
            error: response.error.clone(),
            incomplete_details: response.incomplete_details.clone(),
        }),
    }
}

fn token_usage(usage: &WireUsage) -> TokenUsage {
    TokenUsage {
        input_tokens: usage.input_tokens,
        cached_input_tokens: usage.input_tokens_details.cached_tokens,
        output_tokens: usage.output_tokens,
        reasoning_tokens: usage.output_tokens_details.reasoning_tokens,
        total_tokens: usage.total_tokens,
    }
}

/// Text extension for a list of annotations, positioned from zero.
pub(crate) fn text_extension(annotations: &[Annotation]) -> Option<TextExtension> {
    if annotations.is_empty() {
        return None;
    }
    Some(TextExtension {
        annotations: annotations
            .iter()
            .enumerate()
            .map(|(index, annotation)| TextAnnotation {
                index,
                annotation: annotation.clone(),
            })
            .collect(),
    })
}

/// One text block per content part of a finished message item.
pub(crate) fn message_blocks(item: &MessageItem) -> Result<Vec<ContentBlock>, ProtocolError> {
    item.content
        .iter()
        .map(|part| {
            let text = match part {
                OutputContent::OutputText { text, annotations } => AssistantGenText {
                    text: text.clone(),
                    extension: text_extension(annotations),
                },
                OutputContent::Refusal { refusal } => AssistantGenText {
                    text: refusal.clone(),
                    extension: None,
                },
                OutputContent::Unknown => return Err(ProtocolError::UnrecognizedPart("message")),
            };
            Ok(ContentBlock::new(text)
                .with_item_id(&item.id)
                .with_status(item.status))
        })
        .collect()
}

/// Reasoning block for a reasoning item. Summary parts are joined with
/// `separator`; they are left out when they were already streamed as deltas.
pub(crate) fn reasoning_block(
    item: &ReasoningItem,
    separator: &str,
    include_summary: bool,
) -> ContentBlock {
    let mut reasoning = Reasoning {
        encrypted_content: item.encrypted_content.clone(),
        ..Default::default()
    };
    if include_summary {
        reasoning.text = item
            .summary
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(separator);
        reasoning.summary = item
            .summary
            .iter()
            .enumerate()
            .map(|(index, s)| ReasoningSummary {
                index,
                text: s.text.clone(),
            })
            .collect();
    }
    ContentBlock::new(reasoning)
        .with_item_id(&item.id)
        .with_status(item.status)
}

pub(crate) fn function_call_block(item: &FunctionCallItem, include_arguments: bool) -> ContentBlock {
    ContentBlock::new(FunctionToolCall {
        call_id: item.call_id.clone(),
        name: item.name.clone(),
        arguments: if include_arguments {
            item.arguments.clone()
        } else {
            String::new()
        },
    })
    .with_item_id(&item.id)
    .with_status(item.status)
}

/// An MCP call item split into its call block and its result block, in that order.
pub(crate) fn mcp_call_blocks(
    item: &McpCallItem,
    include_arguments: bool,
) -> (ContentBlock, ContentBlock) {
    let call = ContentBlock::new(McpToolCall {
        server_label: item.server_label.clone(),
        call_id: item.id.clone(),
        name: item.name.clone(),
        arguments: if include_arguments {
            item.arguments.clone()
        } else {
            String::new()
        },
        approval_request_id: item.approval_request_id.clone(),
    })
    .with_item_id(&item.id)
    .with_status(item.status);

    let result = ContentBlock::new(McpToolResult {
        call_id: item.id.clone(),
        name: item.name.clone(),
        result: item.output.clone().unwrap_or_default(),
        error: item.error.clone(),
    })
    .with_item_id(&item.id)
    .with_status(item.status);

    (call, result)
}

pub(crate) fn mcp_list_tools_block(item: &McpListToolsItem) -> ContentBlock {
    let status = if item.error.is_some() {
        ItemStatus::Failed
    } else {
        ItemStatus::Completed
    };
    ContentBlock::new(McpListToolsResult {
        server_label: item.server_label.clone(),
        tools: Some(item.tools.clone()),
        error: item.error.clone(),
    })
    .with_item_id(&item.id)
    .with_status(status)
}

pub(crate) fn mcp_approval_request_block(item: &McpApprovalRequestItem) -> ContentBlock {
    ContentBlock::new(McpToolApprovalRequest {
        id: item.id.clone(),
        server_label: item.server_label.clone(),
        name: item.name.clone(),
        arguments: item.arguments.clone(),
    })
    .with_item_id(&item.id)
}

pub(crate) fn mcp_approval_response_block(item: &McpApprovalResponseItem) -> ContentBlock {
    ContentBlock::new(McpToolApprovalResponse {
        approval_request_id: item.approval_request_id.clone(),
        approve: item.approve,
        reason: item.reason.clone(),
    })
    .with_item_id(item.id.clone().unwrap_or_default())
}

/// A web search call split into a server tool call block (the action without its
/// sources) and a server tool result block (the sources), in that order.
pub(crate) fn web_search_blocks(
    item: &WebSearchCallItem,
    tool_name: &str,
) -> Result<(ContentBlock, ContentBlock), Error> {
    let (arguments, sources) = match &item.action {
        Some(action) => {
            let query_only = WebSearchAction {
                sources: None,
                ..action.clone()
            };
            (
                Some(serde_json::to_value(query_only)?),
                action.sources.clone().unwrap_or_default(),
            )
        }
        None => (None, Vec::new()),
    };

    let call = ContentBlock::new(ServerToolCall {
        name: tool_name.to_string(),
        call_id: item.id.clone(),
        arguments,
    })
    .with_item_id(&item.id)
    .with_status(item.status);

    let result = ContentBlock::new(ServerToolResult {
        name: tool_name.to_string(),
        call_id: item.id.clone(),
        result: Some(serde_json::to_value(sources)?),
    })
    .with_item_id(&item.id)
    .with_status(item.status);

    Ok((call, result))
}
