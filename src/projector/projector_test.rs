// ABOUTME: Tests for the event projector and the non-streaming projection,
// ABOUTME: driven by hand-built vendor events and concatenated back into blocks.

use super::*;
use crate::concat::{concat_block_chunks, concat_chunks};
use crate::config::StreamConfig;
use crate::error::{ConcatError, Error, ProtocolError};
use crate::schema::{Annotation, BlockContent, ContentBlockChunk, ItemStatus, StreamChunk};
use crate::wire::{
    EventPosition, FunctionCallItem, McpCallItem, McpListToolsItem, MessageItem, OutputContent,
    OutputItem, ReasoningItem, ResponseObject, ResponseStreamEvent, SummaryText, WebSearchAction,
    WebSearchCallItem, WebSearchSource, WireUsage,
};

fn project_all(projector: &mut EventProjector, events: &[ResponseStreamEvent]) -> Vec<StreamChunk> {
    events
        .iter()
        .flat_map(|event| projector.project(event).unwrap())
        .collect()
}

fn blocks(chunks: &[StreamChunk]) -> Vec<ContentBlockChunk> {
    chunks.iter().filter_map(|c| c.as_block().cloned()).collect()
}

fn part() -> OutputContent {
    OutputContent::OutputText {
        text: String::new(),
        annotations: Vec::new(),
    }
}

fn text_delta(output_index: usize, content_index: usize, delta: &str) -> ResponseStreamEvent {
    ResponseStreamEvent::OutputTextDelta {
        item_id: "msg_1".into(),
        output_index,
        content_index,
        delta: delta.into(),
    }
}

fn summary_delta(output_index: usize, summary_index: usize, delta: &str) -> ResponseStreamEvent {
    ResponseStreamEvent::ReasoningSummaryTextDelta {
        item_id: "rs_1".into(),
        output_index,
        summary_index,
        delta: delta.into(),
    }
}

fn mcp_item() -> McpCallItem {
    McpCallItem {
        id: "m1".into(),
        server_label: "docs".into(),
        name: "tool".into(),
        arguments: "{}".into(),
        output: Some("out".into()),
        status: Some(ItemStatus::Completed),
        ..Default::default()
    }
}

fn reasoning_text(block: &crate::schema::ContentBlock) -> &str {
    match &block.content {
        BlockContent::Reasoning(r) => &r.text,
        other => panic!("Expected reasoning block, got {:?}", other),
    }
}

#[test]
fn test_simple_text_stream() {
    let mut projector = EventProjector::default();
    let events = vec![
        ResponseStreamEvent::ContentPartAdded {
            item_id: "msg_1".into(),
            output_index: 1,
            content_index: 1,
            part: part(),
        },
        text_delta(1, 1, "He"),
        text_delta(1, 1, "llo"),
        ResponseStreamEvent::ContentPartDone {
            item_id: "msg_1".into(),
            output_index: 1,
            content_index: 1,
            part: part(),
        },
    ];
    let chunks = project_all(&mut projector, &events);
    assert_eq!(chunks.len(), 4);

    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 1);
    match &merged[0].content {
        BlockContent::AssistantGenText(text) => assert_eq!(text.text, "Hello"),
        other => panic!("Expected text block, got {:?}", other),
    }
    assert_eq!(merged[0].status(), Some(ItemStatus::Completed));
}

#[test]
fn test_message_done_after_parts() {
    let mut projector = EventProjector::default();
    let events = vec![
        ResponseStreamEvent::ContentPartAdded {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index: 0,
            part: part(),
        },
        text_delta(0, 0, "Hi"),
        ResponseStreamEvent::ContentPartDone {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index: 0,
            part: part(),
        },
        ResponseStreamEvent::OutputItemDone {
            output_index: 0,
            item: OutputItem::Message(MessageItem {
                id: "msg_1".into(),
                ..Default::default()
            }),
        },
    ];
    let chunks = project_all(&mut projector, &events);
    // The done event carries nothing that was not already streamed.
    assert_eq!(chunks.len(), 3);
}

#[test]
fn test_mcp_call_splits_into_two_blocks() {
    let mut projector = EventProjector::default();
    let chunks = projector
        .project(&ResponseStreamEvent::OutputItemDone {
            output_index: 40,
            item: OutputItem::McpCall(mcp_item()),
        })
        .unwrap();
    assert_eq!(chunks.len(), 2);

    let call = chunks[0].as_block().unwrap();
    let result = chunks[1].as_block().unwrap();
    assert_ne!(call.index(), result.index());
    assert_eq!(call.block.content.kind(), "mcp_tool_call");
    assert_eq!(result.block.content.kind(), "mcp_tool_result");
    assert_eq!(call.block.item_id(), Some("m1"));
    assert_eq!(result.block.item_id(), Some("m1"));
    match &result.block.content {
        BlockContent::McpToolResult(r) => assert_eq!(r.result, "out"),
        other => panic!("Expected mcp result, got {:?}", other),
    }
}

#[test]
fn test_message_done_without_parts_fails() {
    let mut projector = EventProjector::default();
    let err = projector
        .project(&ResponseStreamEvent::OutputItemDone {
            output_index: 0,
            item: OutputItem::Message(MessageItem {
                id: "mid".into(),
                ..Default::default()
            }),
        })
        .unwrap_err();
    assert!(err.to_string().contains("not found in processing queue"));
    assert!(err.is_protocol());
}

#[test]
fn test_reasoning_summary_separator() {
    let mut projector = EventProjector::default();
    let chunks = project_all(
        &mut projector,
        &[
            summary_delta(1, 0, "first"),
            summary_delta(1, 0, " more"),
            summary_delta(1, 1, "second"),
            summary_delta(1, 1, " again"),
        ],
    );
    let texts: Vec<&str> = chunks
        .iter()
        .map(|c| reasoning_text(&c.as_block().unwrap().block))
        .collect();
    assert_eq!(texts, vec!["first", " more", "\nsecond", " again"]);

    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    match &merged[0].content {
        BlockContent::Reasoning(r) => {
            assert_eq!(r.text, "first more\nsecond again");
            assert_eq!(r.summary.len(), 2);
            assert_eq!(r.summary[1].text, "second again");
        }
        other => panic!("Expected reasoning block, got {:?}", other),
    }
}

#[test]
fn test_custom_reasoning_separator() {
    let mut projector = EventProjector::new(StreamConfig::new().reasoning_separator("\n\n"));
    let chunks = project_all(
        &mut projector,
        &[summary_delta(0, 0, "a"), summary_delta(0, 1, "b")],
    );
    assert_eq!(reasoning_text(&chunks[1].as_block().unwrap().block), "\n\nb");
}

#[test]
fn test_reasoning_done_does_not_repeat_streamed_summary() {
    let mut projector = EventProjector::default();
    let item = ReasoningItem {
        id: "rs_1".into(),
        summary: vec![SummaryText {
            text: "think".into(),
        }],
        encrypted_content: Some("opaque".into()),
        status: Some(ItemStatus::Completed),
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 0,
                item: OutputItem::Reasoning(ReasoningItem {
                    id: "rs_1".into(),
                    ..Default::default()
                }),
            },
            summary_delta(0, 0, "think"),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::Reasoning(item),
            },
        ],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 1);
    match &merged[0].content {
        BlockContent::Reasoning(r) => {
            assert_eq!(r.text, "think");
            assert_eq!(r.encrypted_content.as_deref(), Some("opaque"));
        }
        other => panic!("Expected reasoning block, got {:?}", other),
    }
    assert_eq!(merged[0].status(), Some(ItemStatus::Completed));
}

#[test]
fn test_reasoning_done_without_deltas_carries_summary() {
    let mut projector = EventProjector::default();
    let chunks = projector
        .project(&ResponseStreamEvent::OutputItemDone {
            output_index: 2,
            item: OutputItem::Reasoning(ReasoningItem {
                id: "rs_1".into(),
                summary: vec![
                    SummaryText { text: "a".into() },
                    SummaryText { text: "b".into() },
                ],
                ..Default::default()
            }),
        })
        .unwrap();
    assert_eq!(reasoning_text(&chunks[0].as_block().unwrap().block), "a\nb");
}

#[test]
fn test_function_arguments_not_duplicated() {
    let mut projector = EventProjector::default();
    let call = FunctionCallItem {
        id: "fc_1".into(),
        call_id: "call_1".into(),
        name: "get_weather".into(),
        arguments: String::new(),
        status: Some(ItemStatus::InProgress),
    };
    let done = FunctionCallItem {
        arguments: "{\"city\":\"Paris\"}".into(),
        status: Some(ItemStatus::Completed),
        ..call.clone()
    };
    let delta = |d: &str| ResponseStreamEvent::FunctionCallArgumentsDelta {
        item_id: "fc_1".into(),
        output_index: 0,
        delta: d.into(),
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 0,
                item: OutputItem::FunctionCall(call),
            },
            delta("{\"city\":"),
            delta("\"Paris\"}"),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::FunctionCall(done),
            },
        ],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 1);
    match &merged[0].content {
        BlockContent::FunctionToolCall(f) => {
            assert_eq!(f.call_id, "call_1");
            assert_eq!(f.name, "get_weather");
            assert_eq!(f.arguments, "{\"city\":\"Paris\"}");
        }
        other => panic!("Expected function call, got {:?}", other),
    }
    assert_eq!(merged[0].status(), Some(ItemStatus::Completed));
}

#[test]
fn test_function_arguments_from_done_when_not_streamed() {
    let mut projector = EventProjector::default();
    let chunks = projector
        .project(&ResponseStreamEvent::OutputItemDone {
            output_index: 0,
            item: OutputItem::FunctionCall(FunctionCallItem {
                call_id: "call_1".into(),
                arguments: "{}".into(),
                ..Default::default()
            }),
        })
        .unwrap();
    match &chunks[0].as_block().unwrap().block.content {
        BlockContent::FunctionToolCall(f) => assert_eq!(f.arguments, "{}"),
        other => panic!("Expected function call, got {:?}", other),
    }
}

#[test]
fn test_duplicate_annotation_index_fails_concat() {
    let mut projector = EventProjector::default();
    let annotation = |url: &str| ResponseStreamEvent::OutputTextAnnotationAdded {
        item_id: "msg_1".into(),
        output_index: 0,
        content_index: 0,
        annotation_index: 0,
        annotation: Annotation::UrlCitation {
            url: url.into(),
            title: String::new(),
            start_index: 0,
            end_index: 4,
        },
    };
    let chunks = project_all(
        &mut projector,
        &[annotation("https://a.example"), annotation("https://b.example")],
    );
    let err = concat_block_chunks(&blocks(&chunks)).unwrap_err();
    assert!(matches!(err, ConcatError::DuplicateAnnotationIndex(0)));
}

#[test]
fn test_annotations_are_scoped_per_part() {
    let mut projector = EventProjector::default();
    let annotation = |content_index: usize, annotation_index: usize| {
        ResponseStreamEvent::OutputTextAnnotationAdded {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index,
            annotation_index,
            annotation: Annotation::FilePath {
                file_id: "file_1".into(),
                index: 0,
            },
        }
    };
    let chunks = project_all(
        &mut projector,
        &[annotation(0, 5), annotation(1, 5), annotation(0, 9)],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 2);
    match &merged[0].content {
        BlockContent::AssistantGenText(text) => {
            assert_eq!(text.extension.as_ref().unwrap().annotations.len(), 2)
        }
        other => panic!("Expected text block, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_event_fails() {
    let mut projector = EventProjector::default();
    let err = projector.project(&ResponseStreamEvent::Unknown).unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::UnrecognizedEvent(_))
    ));
}

#[test]
fn test_unrecognized_item_fails() {
    let mut projector = EventProjector::default();
    for event in [
        ResponseStreamEvent::OutputItemAdded {
            output_index: 0,
            item: OutputItem::Unknown,
        },
        ResponseStreamEvent::OutputItemDone {
            output_index: 0,
            item: OutputItem::Unknown,
        },
    ] {
        let err = projector.project(&event).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnrecognizedItem(_))
        ));
    }
}

#[test]
fn test_unrecognized_part_fails() {
    let mut projector = EventProjector::default();
    let err = projector
        .project(&ResponseStreamEvent::ContentPartAdded {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index: 0,
            part: OutputContent::Unknown,
        })
        .unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_vendor_error_event_fails() {
    let mut projector = EventProjector::default();
    let err = projector
        .project(&ResponseStreamEvent::Error {
            code: Some("rate_limit_exceeded".into()),
            message: "slow down".into(),
        })
        .unwrap_err();
    match err {
        Error::Protocol(ProtocolError::Vendor { code, message }) => {
            assert_eq!(code, "rate_limit_exceeded");
            assert_eq!(message, "slow down");
        }
        other => panic!("Expected vendor error, got {:?}", other),
    }
}

#[test]
fn test_ignorable_events_produce_nothing() {
    let mut projector = EventProjector::default();
    let position = EventPosition {
        item_id: "msg_1".into(),
        output_index: 0,
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputTextDone(position.clone()),
            ResponseStreamEvent::ReasoningSummaryPartAdded(position.clone()),
            ResponseStreamEvent::FunctionCallArgumentsDone(position),
        ],
    );
    assert!(chunks.is_empty());
    assert_eq!(projector.allocated(), 0);
}

#[test]
fn test_mcp_phase_enriched_from_cache() {
    let mut projector = EventProjector::default();
    let position = EventPosition {
        item_id: "m1".into(),
        output_index: 3,
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 3,
                item: OutputItem::McpCall(McpCallItem {
                    id: "m1".into(),
                    server_label: "docs".into(),
                    name: "search".into(),
                    ..Default::default()
                }),
            },
            ResponseStreamEvent::McpCallInProgress(position.clone()),
            ResponseStreamEvent::McpCallCompleted(position),
        ],
    );
    assert_eq!(chunks.len(), 2);
    let first = &chunks[0].as_block().unwrap().block;
    match &first.content {
        BlockContent::McpToolCall(call) => {
            assert_eq!(call.server_label, "docs");
            assert_eq!(call.name, "search");
            assert_eq!(call.call_id, "m1");
        }
        other => panic!("Expected mcp call, got {:?}", other),
    }
    assert_eq!(first.status(), Some(ItemStatus::InProgress));
    assert_eq!(
        chunks[1].as_block().unwrap().block.status(),
        Some(ItemStatus::Completed)
    );
}

#[test]
fn test_mcp_phase_without_cache_uses_item_id() {
    let mut projector = EventProjector::default();
    let chunks = projector
        .project(&ResponseStreamEvent::McpCallFailed(EventPosition {
            item_id: "m7".into(),
            output_index: 0,
        }))
        .unwrap();
    let block = &chunks[0].as_block().unwrap().block;
    match &block.content {
        BlockContent::McpToolCall(call) => {
            assert_eq!(call.call_id, "m7");
            assert!(call.server_label.is_empty());
        }
        other => panic!("Expected mcp call, got {:?}", other),
    }
    assert_eq!(block.status(), Some(ItemStatus::Failed));
}

#[test]
fn test_streamed_mcp_call_merges_cleanly() {
    let mut projector = EventProjector::default();
    let position = EventPosition {
        item_id: "m1".into(),
        output_index: 1,
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 1,
                item: OutputItem::McpCall(McpCallItem {
                    id: "m1".into(),
                    server_label: "docs".into(),
                    name: "tool".into(),
                    ..Default::default()
                }),
            },
            ResponseStreamEvent::McpCallInProgress(position.clone()),
            ResponseStreamEvent::McpCallArgumentsDelta {
                item_id: "m1".into(),
                output_index: 1,
                delta: "{}".into(),
            },
            ResponseStreamEvent::McpCallCompleted(position),
            ResponseStreamEvent::OutputItemDone {
                output_index: 1,
                item: OutputItem::McpCall(mcp_item()),
            },
        ],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 2);
    match &merged[0].content {
        BlockContent::McpToolCall(call) => {
            assert_eq!(call.arguments, "{}");
            assert_eq!(call.server_label, "docs");
        }
        other => panic!("Expected mcp call, got {:?}", other),
    }
    match &merged[1].content {
        BlockContent::McpToolResult(result) => assert_eq!(result.result, "out"),
        other => panic!("Expected mcp result, got {:?}", other),
    }
}

#[test]
fn test_mcp_list_tools_phase_and_done() {
    let mut projector = EventProjector::default();
    let position = EventPosition {
        item_id: "lt_1".into(),
        output_index: 0,
    };
    let list = McpListToolsItem {
        id: "lt_1".into(),
        server_label: "docs".into(),
        tools: vec![crate::schema::McpToolSpec {
            name: "search".into(),
            ..Default::default()
        }],
        error: None,
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 0,
                item: OutputItem::McpListTools(list.clone()),
            },
            ResponseStreamEvent::McpListToolsInProgress(position),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::McpListTools(list),
            },
        ],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 1);
    match &merged[0].content {
        BlockContent::McpListToolsResult(result) => {
            assert_eq!(result.server_label, "docs");
            assert_eq!(result.tools.as_ref().unwrap().len(), 1);
        }
        other => panic!("Expected list tools result, got {:?}", other),
    }
    assert_eq!(merged[0].status(), Some(ItemStatus::Completed));
}

#[test]
fn test_web_search_done_yields_call_then_result() {
    let mut projector = EventProjector::default();
    let search = WebSearchCallItem {
        id: "ws_1".into(),
        status: Some(ItemStatus::Completed),
        action: Some(WebSearchAction {
            kind: "search".into(),
            query: Some("tokio".into()),
            sources: Some(vec![WebSearchSource {
                kind: "url".into(),
                url: "https://tokio.rs".into(),
            }]),
            ..Default::default()
        }),
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::WebSearchCallSearching(EventPosition {
                item_id: "ws_1".into(),
                output_index: 0,
            }),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::WebSearchCall(search),
            },
        ],
    );
    assert_eq!(chunks.len(), 3);
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 2);
    match &merged[0].content {
        BlockContent::ServerToolCall(call) => {
            assert_eq!(call.name, "web_search");
            let arguments = call.arguments.as_ref().unwrap();
            assert_eq!(arguments["query"], "tokio");
            assert!(arguments.get("sources").is_none());
        }
        other => panic!("Expected server tool call, got {:?}", other),
    }
    match &merged[1].content {
        BlockContent::ServerToolResult(result) => {
            let sources = result.result.as_ref().unwrap();
            assert_eq!(sources[0]["url"], "https://tokio.rs");
        }
        other => panic!("Expected server tool result, got {:?}", other),
    }
}

#[test]
fn test_lifecycle_events_carry_meta() {
    let mut projector = EventProjector::default();
    let response = ResponseObject {
        id: "resp_1".into(),
        model: "gpt-test".into(),
        status: Some(crate::schema::ResponseStatus::Completed),
        usage: Some(WireUsage {
            input_tokens: 3,
            output_tokens: 4,
            total_tokens: 7,
            ..Default::default()
        }),
        ..Default::default()
    };
    let chunks = project_all(
        &mut projector,
        &[ResponseStreamEvent::Completed { response }],
    );
    let meta = chunks[0].as_meta().unwrap();
    assert_eq!(meta.usage.as_ref().unwrap().total_tokens, 7);
    assert_eq!(meta.extension.as_ref().unwrap().model, "gpt-test");

    let message = concat_chunks(&chunks).unwrap();
    assert!(message.content.is_empty());
    assert_eq!(message.usage().unwrap().output_tokens, 4);
}

#[test]
fn test_indices_follow_first_sight() {
    let mut projector = EventProjector::default();
    let chunks = project_all(
        &mut projector,
        &[
            summary_delta(0, 0, "plan"),
            text_delta(1, 0, "a"),
            summary_delta(0, 0, "more"),
            text_delta(1, 1, "b"),
        ],
    );
    let indices: Vec<usize> = chunks
        .iter()
        .map(|c| c.as_block().unwrap().index())
        .collect();
    assert_eq!(indices, vec![0, 1, 0, 2]);
    assert_eq!(projector.allocated(), 3);
}

#[test]
fn test_project_complete_single_mcp_result() {
    let response = ResponseObject {
        id: "resp_1".into(),
        output: vec![
            OutputItem::Message(MessageItem {
                id: "msg_1".into(),
                role: "assistant".into(),
                status: Some(ItemStatus::Completed),
                content: vec![OutputContent::OutputText {
                    text: "Done".into(),
                    annotations: Vec::new(),
                }],
            }),
            OutputItem::McpCall(mcp_item()),
        ],
        ..Default::default()
    };
    let message = project_complete(&response).unwrap();
    let kinds: Vec<&str> = message.content.iter().map(|b| b.content.kind()).collect();
    assert_eq!(
        kinds,
        vec!["assistant_gen_text", "mcp_tool_call", "mcp_tool_result"]
    );
    assert_eq!(message.text(), "Done");
    assert_eq!(
        message.response_meta.unwrap().extension.unwrap().id,
        "resp_1"
    );
}

#[test]
fn test_project_complete_rejects_unknown_item() {
    let response = ResponseObject {
        output: vec![OutputItem::Unknown],
        ..Default::default()
    };
    assert!(project_complete(&response).unwrap_err().is_protocol());
}

#[test]
fn test_incomplete_message_closes_open_parts() {
    let mut projector = EventProjector::default();
    let item = MessageItem {
        id: "msg_1".into(),
        role: "assistant".into(),
        status: Some(ItemStatus::Incomplete),
        content: vec![OutputContent::OutputText {
            text: "Hel".into(),
            annotations: Vec::new(),
        }],
    };
    // Cut off by max tokens: the part is never closed.
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::ContentPartAdded {
                item_id: "msg_1".into(),
                output_index: 0,
                content_index: 0,
                part: part(),
            },
            text_delta(0, 0, "Hel"),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::Message(item.clone()),
            },
        ],
    );
    assert_eq!(chunks.len(), 3);
    let streamed = concat_chunks(&chunks).unwrap();
    assert_eq!(streamed.content[0].status(), Some(ItemStatus::Incomplete));

    let complete = project_complete(&ResponseObject {
        id: "resp_1".into(),
        output: vec![OutputItem::Message(item)],
        ..Default::default()
    })
    .unwrap();
    assert_eq!(streamed.content, complete.content);
}

#[test]
fn test_completed_message_adds_no_status_chunks() {
    let mut projector = EventProjector::default();
    let item = MessageItem {
        id: "msg_1".into(),
        role: "assistant".into(),
        status: Some(ItemStatus::Completed),
        content: vec![part()],
    };
    projector
        .project(&ResponseStreamEvent::ContentPartAdded {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index: 0,
            part: part(),
        })
        .unwrap();
    projector
        .project(&ResponseStreamEvent::ContentPartDone {
            item_id: "msg_1".into(),
            output_index: 0,
            content_index: 0,
            part: part(),
        })
        .unwrap();
    let done = projector
        .project(&ResponseStreamEvent::OutputItemDone {
            output_index: 0,
            item: OutputItem::Message(item),
        })
        .unwrap();
    assert!(done.is_empty());
}

#[test]
fn test_refusal_stream_matches_complete_projection() {
    let mut projector = EventProjector::default();
    let refusal = |text: &str| OutputContent::Refusal {
        refusal: text.into(),
    };
    let refusal_delta = |delta: &str| ResponseStreamEvent::RefusalDelta {
        item_id: "msg_1".into(),
        output_index: 0,
        content_index: 0,
        delta: delta.into(),
    };
    let item = MessageItem {
        id: "msg_1".into(),
        role: "assistant".into(),
        status: Some(ItemStatus::Completed),
        content: vec![refusal("I can't help with that.")],
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::ContentPartAdded {
                item_id: "msg_1".into(),
                output_index: 0,
                content_index: 0,
                part: refusal(""),
            },
            refusal_delta("I can't "),
            refusal_delta("help with that."),
            ResponseStreamEvent::RefusalDone(EventPosition {
                item_id: "msg_1".into(),
                output_index: 0,
            }),
            ResponseStreamEvent::ContentPartDone {
                item_id: "msg_1".into(),
                output_index: 0,
                content_index: 0,
                part: refusal("I can't help with that."),
            },
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::Message(item.clone()),
            },
        ],
    );
    let streamed = concat_chunks(&chunks).unwrap();
    assert_eq!(streamed.text(), "I can't help with that.");
    assert_eq!(streamed.content[0].status(), Some(ItemStatus::Completed));

    let complete = project_complete(&ResponseObject {
        output: vec![OutputItem::Message(item)],
        ..Default::default()
    })
    .unwrap();
    assert_eq!(streamed.content, complete.content);
}

#[test]
fn test_web_search_phases_then_done() {
    let mut projector = EventProjector::default();
    let position = EventPosition {
        item_id: "ws_1".into(),
        output_index: 0,
    };
    let search = WebSearchCallItem {
        id: "ws_1".into(),
        status: Some(ItemStatus::Completed),
        action: Some(WebSearchAction {
            kind: "search".into(),
            query: Some("tokio".into()),
            ..Default::default()
        }),
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 0,
                item: OutputItem::WebSearchCall(WebSearchCallItem {
                    id: "ws_1".into(),
                    status: Some(ItemStatus::InProgress),
                    action: None,
                }),
            },
            ResponseStreamEvent::WebSearchCallInProgress(position.clone()),
            ResponseStreamEvent::WebSearchCallSearching(position.clone()),
            ResponseStreamEvent::WebSearchCallCompleted(position),
            ResponseStreamEvent::OutputItemDone {
                output_index: 0,
                item: OutputItem::WebSearchCall(search),
            },
        ],
    );

    let call_statuses: Vec<Option<ItemStatus>> = blocks(&chunks)
        .iter()
        .filter(|c| c.index() == 0)
        .map(|c| c.block.status())
        .collect();
    assert_eq!(
        call_statuses,
        vec![
            Some(ItemStatus::InProgress),
            Some(ItemStatus::Searching),
            Some(ItemStatus::Completed),
            Some(ItemStatus::Completed),
        ]
    );

    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].status(), Some(ItemStatus::Completed));
    match &merged[0].content {
        BlockContent::ServerToolCall(call) => {
            assert_eq!(call.call_id, "ws_1");
            assert_eq!(call.arguments.as_ref().unwrap()["query"], "tokio");
        }
        other => panic!("Expected server tool call, got {:?}", other),
    }
}

#[test]
fn test_mcp_list_tools_failed_phase() {
    let mut projector = EventProjector::default();
    let list = McpListToolsItem {
        id: "lt_1".into(),
        server_label: "docs".into(),
        tools: Vec::new(),
        error: None,
    };
    let chunks = project_all(
        &mut projector,
        &[
            ResponseStreamEvent::OutputItemAdded {
                output_index: 0,
                item: OutputItem::McpListTools(list),
            },
            ResponseStreamEvent::McpListToolsInProgress(EventPosition {
                item_id: "lt_1".into(),
                output_index: 0,
            }),
            ResponseStreamEvent::McpListToolsFailed(EventPosition {
                item_id: "lt_1".into(),
                output_index: 0,
            }),
        ],
    );
    let merged = concat_block_chunks(&blocks(&chunks)).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].status(), Some(ItemStatus::Failed));
    match &merged[0].content {
        BlockContent::McpListToolsResult(result) => assert_eq!(result.server_label, "docs"),
        other => panic!("Expected list tools result, got {:?}", other),
    }
}
