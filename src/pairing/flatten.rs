// ABOUTME: Flattens a finished message back into wire items, one item per block,
// ABOUTME: except adjacent text blocks of one message item which share an item.

use tracing::trace;

use crate::config::StreamConfig;
use crate::error::{Error, PairingError};
use crate::schema::{
    AssistantGenText, BlockContent, ContentBlock, McpListToolsResult, McpToolApprovalRequest,
    McpToolApprovalResponse, McpToolCall, McpToolResult, Message, Reasoning, ServerToolCall,
    ServerToolResult,
};
use crate::wire::{
    FunctionCallItem, McpApprovalRequestItem, McpApprovalResponseItem, McpCallItem,
    McpListToolsItem, MessageItem, OutputContent, OutputItem, ReasoningItem, SummaryText,
    WebSearchAction, WebSearchCallItem, WebSearchSource,
};

/// Wire items for every block of `message`, in block order. MCP and web search
/// calls come out as two partial items each, still to be paired.
pub(crate) fn flatten(message: &Message, config: &StreamConfig) -> Result<Vec<OutputItem>, Error> {
    let mut items: Vec<OutputItem> = Vec::with_capacity(message.content.len());
    for block in &message.content {
        let item = match &block.content {
            BlockContent::AssistantGenText(text) => {
                if let Some(OutputItem::Message(last)) = items.last_mut() {
                    if same_message(last, block) {
                        last.content.push(output_text(text));
                        continue;
                    }
                }
                OutputItem::Message(MessageItem {
                    id: id_of(block),
                    role: "assistant".to_string(),
                    status: block.status(),
                    content: vec![output_text(text)],
                })
            }
            BlockContent::Reasoning(reasoning) => reasoning_item(block, reasoning),
            BlockContent::FunctionToolCall(call) => OutputItem::FunctionCall(FunctionCallItem {
                id: id_of(block),
                call_id: call.call_id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                status: block.status(),
            }),
            BlockContent::McpToolCall(call) => mcp_call_item(block, call),
            BlockContent::McpToolResult(result) => mcp_result_item(block, result),
            BlockContent::McpListToolsResult(list) => list_tools_item(block, list),
            BlockContent::McpToolApprovalRequest(request) => approval_request_item(block, request),
            BlockContent::McpToolApprovalResponse(response) => {
                approval_response_item(block, response)
            }
            BlockContent::ServerToolCall(call) => {
                server_call_item(block, call, &config.web_search_tool_name)?
            }
            BlockContent::ServerToolResult(result) => {
                server_result_item(block, result, &config.web_search_tool_name)?
            }
        };
        items.push(item);
    }
    trace!(blocks = message.content.len(), items = items.len(), "flattened message");
    Ok(items)
}

fn id_of(block: &ContentBlock) -> String {
    block.item_id().unwrap_or_default().to_string()
}

fn same_message(item: &MessageItem, block: &ContentBlock) -> bool {
    !item.id.is_empty() && block.item_id() == Some(item.id.as_str())
}

fn output_text(text: &AssistantGenText) -> OutputContent {
    OutputContent::OutputText {
        text: text.text.clone(),
        annotations: text
            .extension
            .iter()
            .flat_map(|e| e.annotations.iter())
            .map(|a| a.annotation.clone())
            .collect(),
    }
}

fn reasoning_item(block: &ContentBlock, reasoning: &Reasoning) -> OutputItem {
    let summary = if reasoning.summary.is_empty() && !reasoning.text.is_empty() {
        vec![SummaryText {
            text: reasoning.text.clone(),
        }]
    } else {
        reasoning
            .summary
            .iter()
            .map(|s| SummaryText {
                text: s.text.clone(),
            })
            .collect()
    };
    OutputItem::Reasoning(ReasoningItem {
        id: id_of(block),
        summary,
        encrypted_content: reasoning.encrypted_content.clone(),
        status: block.status(),
    })
}

/// Pairing key for call/result items: the originating item id, else the call id.
fn pairing_id(block: &ContentBlock, call_id: &str) -> String {
    match block.item_id() {
        Some(id) => id.to_string(),
        None => call_id.to_string(),
    }
}

fn mcp_call_item(block: &ContentBlock, call: &McpToolCall) -> OutputItem {
    OutputItem::McpCall(McpCallItem {
        id: pairing_id(block, &call.call_id),
        server_label: call.server_label.clone(),
        name: call.name.clone(),
        arguments: call.arguments.clone(),
        status: block.status(),
        approval_request_id: call.approval_request_id.clone(),
        ..Default::default()
    })
}

fn mcp_result_item(block: &ContentBlock, result: &McpToolResult) -> OutputItem {
    OutputItem::McpCall(McpCallItem {
        id: pairing_id(block, &result.call_id),
        name: result.name.clone(),
        output: Some(result.result.clone()).filter(|o| !o.is_empty()),
        error: result.error.clone(),
        status: block.status(),
        ..Default::default()
    })
}

fn list_tools_item(block: &ContentBlock, list: &McpListToolsResult) -> OutputItem {
    OutputItem::McpListTools(McpListToolsItem {
        id: id_of(block),
        server_label: list.server_label.clone(),
        tools: list.tools.clone().unwrap_or_default(),
        error: list.error.clone(),
    })
}

fn approval_request_item(block: &ContentBlock, request: &McpToolApprovalRequest) -> OutputItem {
    let id = if request.id.is_empty() {
        id_of(block)
    } else {
        request.id.clone()
    };
    OutputItem::McpApprovalRequest(McpApprovalRequestItem {
        id,
        server_label: request.server_label.clone(),
        name: request.name.clone(),
        arguments: request.arguments.clone(),
    })
}

fn approval_response_item(block: &ContentBlock, response: &McpToolApprovalResponse) -> OutputItem {
    OutputItem::McpApprovalResponse(McpApprovalResponseItem {
        id: block.item_id().map(str::to_string),
        approval_request_id: response.approval_request_id.clone(),
        approve: response.approve,
        reason: response.reason.clone(),
    })
}

fn server_call_item(
    block: &ContentBlock,
    call: &ServerToolCall,
    web_search: &str,
) -> Result<OutputItem, Error> {
    if call.name != web_search {
        return Err(PairingError::UnsupportedServerTool(call.name.clone()).into());
    }
    let action = match &call.arguments {
        Some(arguments) => Some(serde_json::from_value::<WebSearchAction>(arguments.clone())?),
        None => None,
    };
    Ok(OutputItem::WebSearchCall(WebSearchCallItem {
        id: pairing_id(block, &call.call_id),
        status: block.status(),
        action,
    }))
}

fn server_result_item(
    block: &ContentBlock,
    result: &ServerToolResult,
    web_search: &str,
) -> Result<OutputItem, Error> {
    if result.name != web_search {
        return Err(PairingError::UnsupportedServerTool(result.name.clone()).into());
    }
    let action = match &result.result {
        Some(value) => Some(WebSearchAction {
            sources: Some(serde_json::from_value::<Vec<WebSearchSource>>(value.clone())?),
            ..Default::default()
        }),
        None => None,
    };
    Ok(OutputItem::WebSearchCall(WebSearchCallItem {
        id: pairing_id(block, &result.call_id),
        status: block.status(),
        action,
    }))
}
