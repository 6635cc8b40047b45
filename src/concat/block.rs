// ABOUTME: Merges an ordered group of same-index chunks into one final content block
// ABOUTME: using a per-field rule: concatenate, first wins, last wins, or single instance.

use std::collections::{BTreeMap, HashSet};

use crate::error::ConcatError;
use crate::schema::{
    AssistantGenText, BlockContent, BlockMeta, ContentBlock, ContentBlockChunk, FunctionToolCall,
    McpListToolsResult, McpToolApprovalRequest, McpToolApprovalResponse, McpToolCall,
    McpToolResult, Reasoning, ReasoningSummary, ServerToolCall, ServerToolResult, TextExtension,
};

/// Collect the payloads of one variant from a group already checked to be uniform.
macro_rules! payloads {
    ($group:expr, $variant:ident) => {
        $group
            .iter()
            .filter_map(|b| match &b.content {
                BlockContent::$variant(v) => Some(v),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
}

/// Merge one index's chunks, in arrival order, into a single block.
///
/// A one-element group is returned unchanged.
pub fn concat_blocks(group: &[ContentBlock]) -> Result<ContentBlock, ConcatError> {
    let (first, rest) = group.split_first().ok_or(ConcatError::EmptyGroup)?;
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let kind = first.content.kind();
    if let Some(other) = rest.iter().find(|b| b.content.kind() != kind) {
        return Err(ConcatError::MixedKinds {
            first: kind,
            other: other.content.kind(),
        });
    }

    let content: BlockContent = match &first.content {
        BlockContent::AssistantGenText(_) => {
            concat_text(&payloads!(group, AssistantGenText))?.into()
        }
        BlockContent::Reasoning(_) => concat_reasoning(&payloads!(group, Reasoning))?.into(),
        BlockContent::FunctionToolCall(_) => {
            let parts = payloads!(group, FunctionToolCall);
            FunctionToolCall {
                call_id: first_non_empty(parts.iter().map(|p| p.call_id.as_str())),
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                arguments: parts.iter().map(|p| p.arguments.as_str()).collect(),
            }
            .into()
        }
        BlockContent::ServerToolCall(_) => {
            let parts = payloads!(group, ServerToolCall);
            ServerToolCall {
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                call_id: first_non_empty(parts.iter().map(|p| p.call_id.as_str())),
                arguments: single(parts.iter().map(|p| &p.arguments), "server tool arguments")?,
            }
            .into()
        }
        BlockContent::ServerToolResult(_) => {
            let parts = payloads!(group, ServerToolResult);
            ServerToolResult {
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                call_id: first_non_empty(parts.iter().map(|p| p.call_id.as_str())),
                result: single(parts.iter().map(|p| &p.result), "server tool results")?,
            }
            .into()
        }
        BlockContent::McpToolCall(_) => {
            let parts = payloads!(group, McpToolCall);
            McpToolCall {
                server_label: first_non_empty(parts.iter().map(|p| p.server_label.as_str())),
                call_id: first_non_empty(parts.iter().map(|p| p.call_id.as_str())),
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                arguments: parts.iter().map(|p| p.arguments.as_str()).collect(),
                approval_request_id: first_some(parts.iter().map(|p| &p.approval_request_id)),
            }
            .into()
        }
        BlockContent::McpToolResult(_) => {
            let parts = payloads!(group, McpToolResult);
            McpToolResult {
                call_id: first_non_empty(parts.iter().map(|p| p.call_id.as_str())),
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                result: parts.iter().map(|p| p.result.as_str()).collect(),
                error: single(parts.iter().map(|p| &p.error), "mcp tool errors")?,
            }
            .into()
        }
        BlockContent::McpListToolsResult(_) => {
            let parts = payloads!(group, McpListToolsResult);
            McpListToolsResult {
                server_label: first_non_empty(parts.iter().map(|p| p.server_label.as_str())),
                tools: single(parts.iter().map(|p| &p.tools), "mcp tool lists")?,
                error: single(parts.iter().map(|p| &p.error), "mcp list tools errors")?,
            }
            .into()
        }
        BlockContent::McpToolApprovalRequest(_) => {
            let parts = payloads!(group, McpToolApprovalRequest);
            McpToolApprovalRequest {
                id: first_non_empty(parts.iter().map(|p| p.id.as_str())),
                server_label: first_non_empty(parts.iter().map(|p| p.server_label.as_str())),
                name: first_non_empty(parts.iter().map(|p| p.name.as_str())),
                arguments: parts.iter().map(|p| p.arguments.as_str()).collect(),
            }
            .into()
        }
        BlockContent::McpToolApprovalResponse(_) => {
            let parts = payloads!(group, McpToolApprovalResponse);
            McpToolApprovalResponse {
                approval_request_id: first_non_empty(
                    parts.iter().map(|p| p.approval_request_id.as_str()),
                ),
                approve: parts.iter().any(|p| p.approve),
                reason: first_some(parts.iter().map(|p| &p.reason)),
            }
            .into()
        }
    };

    Ok(ContentBlock {
        content,
        meta: concat_meta(group),
    })
}

/// Group chunks by stream index and merge each group. Blocks come out in
/// ascending index order; chunks within a group keep their arrival order.
pub fn concat_block_chunks(chunks: &[ContentBlockChunk]) -> Result<Vec<ContentBlock>, ConcatError> {
    let mut groups: BTreeMap<usize, Vec<ContentBlock>> = BTreeMap::new();
    for chunk in chunks {
        groups
            .entry(chunk.index())
            .or_default()
            .push(chunk.block.clone());
    }
    groups.values().map(|group| concat_blocks(group)).collect()
}

fn concat_meta(group: &[ContentBlock]) -> BlockMeta {
    BlockMeta {
        item_id: group
            .iter()
            .filter_map(|b| b.meta.item_id.as_ref())
            .find(|id| !id.is_empty())
            .cloned(),
        // Status only ever moves forward.
        item_status: group.iter().filter_map(|b| b.meta.item_status).last(),
    }
}

fn concat_text(parts: &[&AssistantGenText]) -> Result<AssistantGenText, ConcatError> {
    let text = parts.iter().map(|p| p.text.as_str()).collect();

    let extensions: Vec<&TextExtension> = parts.iter().filter_map(|p| p.extension.as_ref()).collect();
    if extensions.is_empty() {
        return Ok(AssistantGenText {
            text,
            extension: None,
        });
    }

    let mut seen = HashSet::new();
    let mut annotations = Vec::new();
    for annotation in extensions.iter().flat_map(|e| e.annotations.iter()) {
        if !seen.insert(annotation.index) {
            return Err(ConcatError::DuplicateAnnotationIndex(annotation.index));
        }
        annotations.push(annotation.clone());
    }
    annotations.sort_by_key(|a| a.index);
    for (position, annotation) in annotations.iter_mut().enumerate() {
        annotation.index = position;
    }

    Ok(AssistantGenText {
        text,
        extension: Some(TextExtension { annotations }),
    })
}

fn concat_reasoning(parts: &[&Reasoning]) -> Result<Reasoning, ConcatError> {
    let mut summary: BTreeMap<usize, String> = BTreeMap::new();
    for part in parts.iter().flat_map(|p| p.summary.iter()) {
        summary.entry(part.index).or_default().push_str(&part.text);
    }

    Ok(Reasoning {
        text: parts.iter().map(|p| p.text.as_str()).collect(),
        summary: summary
            .into_iter()
            .map(|(index, text)| ReasoningSummary { index, text })
            .collect(),
        encrypted_content: single(
            parts.iter().map(|p| &p.encrypted_content),
            "reasoning encrypted contents",
        )?,
    })
}

fn first_non_empty<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub(super) fn first_some<'a, T: Clone + 'a>(
    values: impl IntoIterator<Item = &'a Option<T>>,
) -> Option<T> {
    values.into_iter().flatten().next().cloned()
}

pub(super) fn last_some<'a, T: Clone + 'a>(
    values: impl IntoIterator<Item = &'a Option<T>>,
) -> Option<T> {
    values.into_iter().flatten().last().cloned()
}

/// At most one value may be present across the group.
pub(super) fn single<'a, T: Clone + 'a>(
    values: impl IntoIterator<Item = &'a Option<T>>,
    field: &'static str,
) -> Result<Option<T>, ConcatError> {
    let mut found = None;
    for value in values.into_iter().flatten() {
        if found.is_some() {
            return Err(ConcatError::Multiple(field));
        }
        found = Some(value.clone());
    }
    Ok(found)
}
