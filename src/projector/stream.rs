// ABOUTME: The event projector - a state machine turning vendor stream events into
// ABOUTME: index-stable content block chunks, one event at a time, in arrival order.

use std::collections::HashSet;

use crate::config::StreamConfig;
use crate::error::{Error, ProtocolError};
use crate::index::{
    BlockKey, CacheKey, IndexRegistry, ItemCache, NestedIndexRegistry, PendingBlocks,
};
use crate::schema::{
    AssistantGenText, ContentBlock, FunctionToolCall, ItemStatus, McpListToolsResult,
    McpToolCall, Reasoning, ReasoningSummary, ServerToolCall, StreamChunk, TextAnnotation,
    TextExtension,
};
use crate::wire::{EventPosition, OutputContent, OutputItem, ResponseStreamEvent};

use super::items;

/// Projects one stream's events into chunks.
///
/// All mutable state lives here: the block index registry, the nested
/// sub-index registry, the item cache and the pending block set. One projector
/// serves exactly one stream and is discarded with it.
pub struct EventProjector {
    config: StreamConfig,
    blocks: IndexRegistry<BlockKey>,
    sub_indices: NestedIndexRegistry,
    cache: ItemCache,
    pending: PendingBlocks,
    /// Keys that received payload deltas; their done events must not repeat it.
    streamed: HashSet<BlockKey>,
}

impl Default for EventProjector {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl EventProjector {
    /// Create a projector for a new stream.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            blocks: IndexRegistry::new(),
            sub_indices: NestedIndexRegistry::new(),
            cache: ItemCache::new(),
            pending: PendingBlocks::new(),
            streamed: HashSet::new(),
        }
    }

    /// Project a single event into zero or more chunks.
    ///
    /// Chunks derived from one event come out in a fixed per-kind order (e.g. an
    /// MCP call chunk always precedes its result chunk).
    pub fn project(&mut self, event: &ResponseStreamEvent) -> Result<Vec<StreamChunk>, Error> {
        use ResponseStreamEvent as E;

        tracing::trace!(kind = event.kind(), "projecting event");

        match event {
            E::Created { response }
            | E::Queued { response }
            | E::InProgress { response }
            | E::Completed { response }
            | E::Incomplete { response }
            | E::Failed { response } => Ok(vec![StreamChunk::Meta(items::response_meta(response))]),

            E::OutputItemAdded { output_index, item } => self.item_added(*output_index, item),
            E::OutputItemDone { output_index, item } => self.item_done(*output_index, item),

            E::ContentPartAdded {
                item_id,
                output_index,
                content_index,
                part,
            } => self.content_part_added(item_id, *output_index, *content_index, part),
            E::ContentPartDone {
                item_id,
                output_index,
                content_index,
                part,
            } => self.content_part_done(item_id, *output_index, *content_index, part),

            E::OutputTextDelta {
                item_id,
                output_index,
                content_index,
                delta,
            }
            | E::RefusalDelta {
                item_id,
                output_index,
                content_index,
                delta,
            } => Ok(vec![self.text_delta(
                item_id,
                *output_index,
                *content_index,
                delta,
            )]),
            E::OutputTextAnnotationAdded {
                item_id,
                output_index,
                content_index,
                annotation_index,
                annotation,
            } => {
                let key = BlockKey::AssistantText {
                    output_index: *output_index,
                    content_index: *content_index,
                };
                let index = self.blocks.get_or_allocate(key);
                let sub_index = self.sub_indices.get_or_allocate(key, *annotation_index);
                let block = ContentBlock::new(AssistantGenText {
                    text: String::new(),
                    extension: Some(TextExtension {
                        annotations: vec![TextAnnotation {
                            index: sub_index,
                            annotation: annotation.clone(),
                        }],
                    }),
                })
                .with_item_id(item_id);
                Ok(vec![block.at(index).into()])
            }

            E::FunctionCallArgumentsDelta {
                item_id,
                output_index,
                delta,
            } => {
                let key = BlockKey::FunctionToolCall {
                    output_index: *output_index,
                };
                let index = self.streamed_index(key);
                let block = ContentBlock::new(FunctionToolCall {
                    arguments: delta.clone(),
                    ..Default::default()
                })
                .with_item_id(item_id);
                Ok(vec![block.at(index).into()])
            }
            E::McpCallArgumentsDelta {
                item_id,
                output_index,
                delta,
            } => {
                let key = BlockKey::McpToolCall {
                    output_index: *output_index,
                };
                let index = self.streamed_index(key);
                let block = ContentBlock::new(McpToolCall {
                    call_id: item_id.clone(),
                    arguments: delta.clone(),
                    ..Default::default()
                })
                .with_item_id(item_id);
                Ok(vec![block.at(index).into()])
            }
            E::ReasoningSummaryTextDelta {
                item_id,
                output_index,
                summary_index,
                delta,
            } => Ok(vec![self.reasoning_summary_delta(
                item_id,
                *output_index,
                *summary_index,
                delta,
            )]),

            E::McpCallInProgress(pos) => Ok(vec![self.mcp_call_phase(pos, ItemStatus::InProgress)]),
            E::McpCallCompleted(pos) => Ok(vec![self.mcp_call_phase(pos, ItemStatus::Completed)]),
            E::McpCallFailed(pos) => Ok(vec![self.mcp_call_phase(pos, ItemStatus::Failed)]),
            E::McpListToolsInProgress(pos) => {
                Ok(vec![self.mcp_list_tools_phase(pos, ItemStatus::InProgress)])
            }
            E::McpListToolsCompleted(pos) => {
                Ok(vec![self.mcp_list_tools_phase(pos, ItemStatus::Completed)])
            }
            E::McpListToolsFailed(pos) => {
                Ok(vec![self.mcp_list_tools_phase(pos, ItemStatus::Failed)])
            }
            E::WebSearchCallInProgress(pos) => {
                Ok(vec![self.web_search_phase(pos, ItemStatus::InProgress)])
            }
            E::WebSearchCallSearching(pos) => {
                Ok(vec![self.web_search_phase(pos, ItemStatus::Searching)])
            }
            E::WebSearchCallCompleted(pos) => {
                Ok(vec![self.web_search_phase(pos, ItemStatus::Completed)])
            }

            // Recognized, but everything they carry arrives through other events.
            E::OutputTextDone(_)
            | E::RefusalDone(_)
            | E::FunctionCallArgumentsDone(_)
            | E::McpCallArgumentsDone(_)
            | E::ReasoningSummaryPartAdded(_)
            | E::ReasoningSummaryPartDone(_)
            | E::ReasoningSummaryTextDone(_) => Ok(Vec::new()),

            E::Error { code, message } => Err(ProtocolError::Vendor {
                code: code.clone().unwrap_or_default(),
                message: message.clone(),
            }
            .into()),

            E::Unknown => Err(ProtocolError::UnrecognizedEvent(event.kind().to_string()).into()),
        }
    }

    /// Number of top-level block indices allocated so far.
    pub fn allocated(&self) -> usize {
        self.blocks.len()
    }

    fn streamed_index(&mut self, key: BlockKey) -> usize {
        self.streamed.insert(key);
        self.blocks.get_or_allocate(key)
    }

    fn item_added(
        &mut self,
        output_index: usize,
        item: &OutputItem,
    ) -> Result<Vec<StreamChunk>, Error> {
        match item {
            OutputItem::FunctionCall(call) => {
                let key = BlockKey::FunctionToolCall { output_index };
                let index = if call.arguments.is_empty() {
                    self.blocks.get_or_allocate(key)
                } else {
                    self.streamed_index(key)
                };
                let block = items::function_call_block(call, true);
                Ok(vec![block.at(index).into()])
            }
            OutputItem::Reasoning(reasoning) => {
                let index = self
                    .blocks
                    .get_or_allocate(BlockKey::Reasoning { output_index });
                // Summary and encrypted content arrive later, through deltas or the done event.
                let block = ContentBlock::new(Reasoning::default())
                    .with_item_id(&reasoning.id)
                    .with_status(reasoning.status);
                Ok(vec![block.at(index).into()])
            }
            OutputItem::McpCall(_) => {
                self.cache.put(CacheKey::mcp_call(output_index), item.clone());
                Ok(Vec::new())
            }
            OutputItem::McpListTools(_) => {
                self.cache
                    .put(CacheKey::mcp_list_tools(output_index), item.clone());
                Ok(Vec::new())
            }
            OutputItem::Message(_)
            | OutputItem::WebSearchCall(_)
            | OutputItem::McpApprovalRequest(_)
            | OutputItem::McpApprovalResponse(_) => Ok(Vec::new()),
            OutputItem::Unknown => {
                Err(ProtocolError::UnrecognizedItem("response.output_item.added").into())
            }
        }
    }

    fn item_done(
        &mut self,
        output_index: usize,
        item: &OutputItem,
    ) -> Result<Vec<StreamChunk>, Error> {
        match item {
            OutputItem::Message(message) => {
                let still_open = self.pending.finish(&message.id)?;
                if !still_open.is_empty() {
                    tracing::warn!(
                        item_id = %message.id,
                        indices = ?still_open,
                        "message item finished with content parts still open"
                    );
                }
                // Parts cut short (e.g. by max tokens) take the item's final status.
                Ok(still_open
                    .into_iter()
                    .map(|index| {
                        ContentBlock::text("")
                            .with_item_id(&message.id)
                            .with_status(message.status)
                            .at(index)
                            .into()
                    })
                    .collect())
            }
            OutputItem::Reasoning(reasoning) => {
                let key = BlockKey::Reasoning { output_index };
                let index = self.blocks.get_or_allocate(key);
                let include_summary = !self.streamed.contains(&key);
                let block = items::reasoning_block(
                    reasoning,
                    &self.config.reasoning_separator,
                    include_summary,
                );
                Ok(vec![block.at(index).into()])
            }
            OutputItem::FunctionCall(call) => {
                let key = BlockKey::FunctionToolCall { output_index };
                let index = self.blocks.get_or_allocate(key);
                let block = items::function_call_block(call, !self.streamed.contains(&key));
                Ok(vec![block.at(index).into()])
            }
            OutputItem::McpCall(call) => {
                let call_key = BlockKey::McpToolCall { output_index };
                let call_index = self.blocks.get_or_allocate(call_key);
                let result_index = self
                    .blocks
                    .get_or_allocate(BlockKey::McpToolResult { output_index });
                let (call_block, result_block) =
                    items::mcp_call_blocks(call, !self.streamed.contains(&call_key));
                Ok(vec![
                    call_block.at(call_index).into(),
                    result_block.at(result_index).into(),
                ])
            }
            OutputItem::McpListTools(list) => {
                let index = self
                    .blocks
                    .get_or_allocate(BlockKey::McpListToolsResult { output_index });
                Ok(vec![items::mcp_list_tools_block(list).at(index).into()])
            }
            OutputItem::McpApprovalRequest(request) => {
                let index = self
                    .blocks
                    .get_or_allocate(BlockKey::McpToolApprovalRequest { output_index });
                Ok(vec![items::mcp_approval_request_block(request).at(index).into()])
            }
            OutputItem::WebSearchCall(search) => {
                let call_index = self
                    .blocks
                    .get_or_allocate(BlockKey::ServerToolCall { output_index });
                let result_index = self
                    .blocks
                    .get_or_allocate(BlockKey::ServerToolResult { output_index });
                let (call_block, result_block) =
                    items::web_search_blocks(search, &self.config.web_search_tool_name)?;
                Ok(vec![
                    call_block.at(call_index).into(),
                    result_block.at(result_index).into(),
                ])
            }
            OutputItem::McpApprovalResponse(_) => {
                tracing::debug!(output_index, "ignoring approval response in output");
                Ok(Vec::new())
            }
            OutputItem::Unknown => {
                Err(ProtocolError::UnrecognizedItem("response.output_item.done").into())
            }
        }
    }

    fn content_part_added(
        &mut self,
        item_id: &str,
        output_index: usize,
        content_index: usize,
        part: &OutputContent,
    ) -> Result<Vec<StreamChunk>, Error> {
        if matches!(part, OutputContent::Unknown) {
            return Err(ProtocolError::UnrecognizedPart("response.content_part.added").into());
        }
        let index = self.blocks.get_or_allocate(BlockKey::AssistantText {
            output_index,
            content_index,
        });
        self.pending.open(item_id, index);
        let block = ContentBlock::text("")
            .with_item_id(item_id)
            .with_status(ItemStatus::InProgress);
        Ok(vec![block.at(index).into()])
    }

    fn content_part_done(
        &mut self,
        item_id: &str,
        output_index: usize,
        content_index: usize,
        part: &OutputContent,
    ) -> Result<Vec<StreamChunk>, Error> {
        if matches!(part, OutputContent::Unknown) {
            return Err(ProtocolError::UnrecognizedPart("response.content_part.done").into());
        }
        let index = self.blocks.get_or_allocate(BlockKey::AssistantText {
            output_index,
            content_index,
        });
        self.pending.close(item_id, index)?;
        let block = ContentBlock::text("")
            .with_item_id(item_id)
            .with_status(ItemStatus::Completed);
        Ok(vec![block.at(index).into()])
    }

    fn text_delta(
        &mut self,
        item_id: &str,
        output_index: usize,
        content_index: usize,
        delta: &str,
    ) -> StreamChunk {
        let index = self.blocks.get_or_allocate(BlockKey::AssistantText {
            output_index,
            content_index,
        });
        ContentBlock::text(delta).with_item_id(item_id).at(index).into()
    }

    fn reasoning_summary_delta(
        &mut self,
        item_id: &str,
        output_index: usize,
        summary_index: usize,
        delta: &str,
    ) -> StreamChunk {
        let key = BlockKey::Reasoning { output_index };
        let index = self.streamed_index(key);

        // Parts after the first are separated, but never the first one.
        let first_sight = self.sub_indices.is_new(key, summary_index);
        let sub_index = self.sub_indices.get_or_allocate(key, summary_index);
        let mut text = String::with_capacity(delta.len() + 1);
        if first_sight && summary_index != 0 {
            text.push_str(&self.config.reasoning_separator);
        }
        text.push_str(delta);

        let block = ContentBlock::new(Reasoning {
            text,
            summary: vec![ReasoningSummary {
                index: sub_index,
                text: delta.to_string(),
            }],
            encrypted_content: None,
        })
        .with_item_id(item_id);
        block.at(index).into()
    }

    fn mcp_call_phase(&mut self, pos: &EventPosition, status: ItemStatus) -> StreamChunk {
        let index = self.blocks.get_or_allocate(BlockKey::McpToolCall {
            output_index: pos.output_index,
        });
        let call = match self.cache.mcp_call(pos.output_index) {
            Some(added) => McpToolCall {
                server_label: added.server_label.clone(),
                call_id: added.id.clone(),
                name: added.name.clone(),
                arguments: String::new(),
                approval_request_id: added.approval_request_id.clone(),
            },
            None => McpToolCall {
                call_id: pos.item_id.clone(),
                ..Default::default()
            },
        };
        ContentBlock::new(call)
            .with_item_id(&pos.item_id)
            .with_status(status)
            .at(index)
            .into()
    }

    fn mcp_list_tools_phase(&mut self, pos: &EventPosition, status: ItemStatus) -> StreamChunk {
        let index = self.blocks.get_or_allocate(BlockKey::McpListToolsResult {
            output_index: pos.output_index,
        });
        let server_label = self
            .cache
            .mcp_list_tools(pos.output_index)
            .map(|added| added.server_label.clone())
            .unwrap_or_default();
        ContentBlock::new(McpListToolsResult {
            server_label,
            tools: None,
            error: None,
        })
        .with_item_id(&pos.item_id)
        .with_status(status)
        .at(index)
        .into()
    }

    fn web_search_phase(&mut self, pos: &EventPosition, status: ItemStatus) -> StreamChunk {
        let index = self.blocks.get_or_allocate(BlockKey::ServerToolCall {
            output_index: pos.output_index,
        });
        ContentBlock::new(ServerToolCall {
            name: self.config.web_search_tool_name.clone(),
            call_id: pos.item_id.clone(),
            arguments: None,
        })
        .with_item_id(&pos.item_id)
        .with_status(status)
        .at(index)
        .into()
    }
}
