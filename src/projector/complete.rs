// ABOUTME: Non-streaming projection - maps an already-assembled response straight
// ABOUTME: to a message using the same per-item mapping as the "item done" branch.

use crate::config::StreamConfig;
use crate::error::{Error, ProtocolError};
use crate::schema::Message;
use crate::wire::{OutputItem, ResponseObject};

use super::items;

/// Project a complete response into an assistant message.
pub fn project_complete(response: &ResponseObject) -> Result<Message, Error> {
    project_complete_with(response, &StreamConfig::default())
}

/// Project a complete response into an assistant message using `config`.
///
/// Every item is already final, so no index or pending-set bookkeeping applies.
/// An MCP call contributes its call block and its result block exactly once.
pub fn project_complete_with(
    response: &ResponseObject,
    config: &StreamConfig,
) -> Result<Message, Error> {
    let mut content = Vec::with_capacity(response.output.len());

    for item in &response.output {
        match item {
            OutputItem::Message(message) => content.extend(items::message_blocks(message)?),
            OutputItem::Reasoning(reasoning) => content.push(items::reasoning_block(
                reasoning,
                &config.reasoning_separator,
                true,
            )),
            OutputItem::FunctionCall(call) => content.push(items::function_call_block(call, true)),
            OutputItem::McpCall(call) => {
                let (call_block, result_block) = items::mcp_call_blocks(call, true);
                content.push(call_block);
                content.push(result_block);
            }
            OutputItem::McpListTools(list) => content.push(items::mcp_list_tools_block(list)),
            OutputItem::McpApprovalRequest(request) => {
                content.push(items::mcp_approval_request_block(request))
            }
            OutputItem::McpApprovalResponse(response) => {
                content.push(items::mcp_approval_response_block(response))
            }
            OutputItem::WebSearchCall(search) => {
                let (call_block, result_block) =
                    items::web_search_blocks(search, &config.web_search_tool_name)?;
                content.push(call_block);
                content.push(result_block);
            }
            OutputItem::Unknown => return Err(ProtocolError::UnrecognizedItem("response").into()),
        }
    }

    Ok(Message::assistant(content).with_response_meta(items::response_meta(response)))
}
