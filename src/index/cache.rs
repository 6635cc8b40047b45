// ABOUTME: Item state cache - remembers "item added" payloads for item kinds whose
// ABOUTME: later phase events carry no static fields (server label, tool name).

use std::collections::HashMap;

use crate::wire::{McpCallItem, McpListToolsItem, OutputItem};

/// Item kinds whose "added" payload is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedKind {
    McpCall,
    McpListTools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: CachedKind,
    pub output_index: usize,
}

impl CacheKey {
    pub fn mcp_call(output_index: usize) -> Self {
        Self {
            kind: CachedKind::McpCall,
            output_index,
        }
    }

    pub fn mcp_list_tools(output_index: usize) -> Self {
        Self {
            kind: CachedKind::McpListTools,
            output_index,
        }
    }
}

/// Last-seen "added" payload per cache key. Never evicted for the life of a stream.
#[derive(Debug, Clone, Default)]
pub struct ItemCache {
    items: HashMap<CacheKey, OutputItem>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` under `key`, replacing any previous payload.
    pub fn put(&mut self, key: CacheKey, item: OutputItem) {
        self.items.insert(key, item);
    }

    pub fn get(&self, key: &CacheKey) -> Option<&OutputItem> {
        self.items.get(key)
    }

    /// Cached MCP call added at `output_index`.
    pub fn mcp_call(&self, output_index: usize) -> Option<&McpCallItem> {
        match self.get(&CacheKey::mcp_call(output_index))? {
            OutputItem::McpCall(call) => Some(call),
            _ => None,
        }
    }

    /// Cached MCP list-tools item added at `output_index`.
    pub fn mcp_list_tools(&self, output_index: usize) -> Option<&McpListToolsItem> {
        match self.get(&CacheKey::mcp_list_tools(output_index))? {
            OutputItem::McpListTools(list) => Some(list),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
