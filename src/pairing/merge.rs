// ABOUTME: Re-pairs call and result halves that share an id into single wire items,
// ABOUTME: for replaying a finished message as input to a later request.

use std::collections::HashMap;

use tracing::debug;

use super::flatten::flatten;
use crate::config::StreamConfig;
use crate::error::{Error, PairingError};
use crate::schema::Message;
use crate::wire::{McpCallItem, OutputItem, WebSearchAction, WebSearchCallItem};

type PairKey = (&'static str, String);

/// Wire items for replaying `message` as request input, with MCP and web search
/// call/result halves merged. Uses the default configuration.
pub fn pair_for_reuse(message: &Message) -> Result<Vec<OutputItem>, Error> {
    pair_for_reuse_with(message, &StreamConfig::default())
}

/// Like [`pair_for_reuse`], with an explicit configuration for the web search
/// tool name.
pub fn pair_for_reuse_with(message: &Message, config: &StreamConfig) -> Result<Vec<OutputItem>, Error> {
    let items = flatten(message, config)?;
    Ok(pair_items(items)?)
}

/// Merge every pair of items sharing an id. Each id must appear exactly twice;
/// the merged item takes the position of the first half.
pub fn pair_items(items: Vec<OutputItem>) -> Result<Vec<OutputItem>, PairingError> {
    let mut order: Vec<PairKey> = Vec::new();
    let mut counts: HashMap<PairKey, usize> = HashMap::new();
    for item in &items {
        if let Some(key) = pair_key(item)? {
            let count = counts.entry(key.clone()).or_default();
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }
    for key in order {
        let found = counts.get(&key).copied().unwrap_or_default();
        if found != 2 {
            let (kind, id) = key;
            return Err(PairingError::Cardinality { kind, id, found });
        }
    }

    let mut paired: Vec<OutputItem> = Vec::with_capacity(items.len());
    let mut slots: HashMap<PairKey, usize> = HashMap::new();
    for item in items {
        let Some(key) = pair_key(&item)? else {
            paired.push(item);
            continue;
        };
        match slots.get(&key) {
            Some(&position) => {
                debug!(kind = key.0, id = %key.1, "merging paired items");
                merge_into(&mut paired[position], item);
            }
            None => {
                slots.insert(key, paired.len());
                paired.push(item);
            }
        }
    }
    Ok(paired)
}

fn pair_key(item: &OutputItem) -> Result<Option<PairKey>, PairingError> {
    let id = match item {
        OutputItem::McpCall(call) => &call.id,
        OutputItem::WebSearchCall(call) => &call.id,
        _ => return Ok(None),
    };
    if id.is_empty() {
        return Err(PairingError::MissingId(item.kind()));
    }
    Ok(Some((item.kind(), id.clone())))
}

// Pair keys carry the item kind, so both halves are always the same variant.
fn merge_into(target: &mut OutputItem, other: OutputItem) {
    match (target, other) {
        (OutputItem::McpCall(first), OutputItem::McpCall(second)) => merge_mcp(first, second),
        (OutputItem::WebSearchCall(first), OutputItem::WebSearchCall(second)) => {
            merge_web_search(first, second)
        }
        _ => {}
    }
}

fn fill(target: &mut String, other: String) {
    if target.is_empty() {
        *target = other;
    }
}

fn fill_opt<T>(target: &mut Option<T>, other: Option<T>) {
    if target.is_none() {
        *target = other;
    }
}

fn merge_mcp(first: &mut McpCallItem, second: McpCallItem) {
    fill(&mut first.server_label, second.server_label);
    fill(&mut first.name, second.name);
    fill(&mut first.arguments, second.arguments);
    fill_opt(&mut first.output, second.output);
    fill_opt(&mut first.error, second.error);
    fill_opt(&mut first.status, second.status);
    fill_opt(&mut first.approval_request_id, second.approval_request_id);
}

fn merge_web_search(first: &mut WebSearchCallItem, second: WebSearchCallItem) {
    fill_opt(&mut first.status, second.status);
    first.action = match (first.action.take(), second.action) {
        (Some(mut action), Some(other)) => {
            merge_action(&mut action, other);
            Some(action)
        }
        (action, other) => action.or(other),
    };
}

fn merge_action(first: &mut WebSearchAction, second: WebSearchAction) {
    fill(&mut first.kind, second.kind);
    fill_opt(&mut first.query, second.query);
    fill_opt(&mut first.url, second.url);
    fill_opt(&mut first.pattern, second.pattern);
    fill_opt(&mut first.sources, second.sources);
}
