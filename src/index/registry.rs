// ABOUTME: Index registries - stable, first-sight-ordered index allocation for
// ABOUTME: compound block keys, plus a nested registry scoped under a parent key.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Compound key identifying one logical block within a stream.
///
/// Keys are structural so that coordinates of different kinds never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKey {
    Reasoning { output_index: usize },
    AssistantText { output_index: usize, content_index: usize },
    FunctionToolCall { output_index: usize },
    McpToolCall { output_index: usize },
    McpToolResult { output_index: usize },
    McpListToolsResult { output_index: usize },
    McpToolApprovalRequest { output_index: usize },
    ServerToolCall { output_index: usize },
    ServerToolResult { output_index: usize },
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKey::Reasoning { output_index } => write!(f, "reasoning:{output_index}"),
            BlockKey::AssistantText {
                output_index,
                content_index,
            } => write!(f, "assistant_gen_text:{output_index}:{content_index}"),
            BlockKey::FunctionToolCall { output_index } => {
                write!(f, "function_tool_call:{output_index}")
            }
            BlockKey::McpToolCall { output_index } => write!(f, "mcp_tool_call:{output_index}"),
            BlockKey::McpToolResult { output_index } => {
                write!(f, "mcp_tool_result:{output_index}")
            }
            BlockKey::McpListToolsResult { output_index } => {
                write!(f, "mcp_list_tools_result:{output_index}")
            }
            BlockKey::McpToolApprovalRequest { output_index } => {
                write!(f, "mcp_tool_approval_request:{output_index}")
            }
            BlockKey::ServerToolCall { output_index } => {
                write!(f, "server_tool_call:{output_index}")
            }
            BlockKey::ServerToolResult { output_index } => {
                write!(f, "server_tool_result:{output_index}")
            }
        }
    }
}

/// Allocates indices 0, 1, 2, ... to keys in the order they are first seen.
///
/// An allocated index is never reassigned, reused or removed.
#[derive(Debug, Clone)]
pub struct IndexRegistry<K = BlockKey> {
    indices: HashMap<K, usize>,
}

impl<K> Default for IndexRegistry<K> {
    fn default() -> Self {
        Self {
            indices: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> IndexRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `key`, allocating the next one on first sight.
    pub fn get_or_allocate(&mut self, key: K) -> usize {
        // Nothing is ever removed, so the count is always max_allocated + 1.
        let next = self.indices.len();
        *self.indices.entry(key).or_insert(next)
    }

    /// Index of `key` if it has been allocated.
    pub fn get(&self, key: &K) -> Option<usize> {
        self.indices.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.indices.contains_key(key)
    }

    /// Number of allocated indices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Sub-index allocation scoped under a parent block key.
///
/// Used for reasoning summary parts and text annotations: every parent gets
/// its own 0-based sequence.
#[derive(Debug, Clone, Default)]
pub struct NestedIndexRegistry {
    scopes: HashMap<BlockKey, IndexRegistry<usize>>,
}

impl NestedIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-index of `inner` under `outer`, allocated on first sight.
    pub fn get_or_allocate(&mut self, outer: BlockKey, inner: usize) -> usize {
        self.scopes.entry(outer).or_default().get_or_allocate(inner)
    }

    /// True the first time `inner` is seen under `outer`. Records the pair.
    pub fn is_new(&mut self, outer: BlockKey, inner: usize) -> bool {
        let scope = self.scopes.entry(outer).or_default();
        if scope.contains(&inner) {
            return false;
        }
        scope.get_or_allocate(inner);
        true
    }

    /// Sub-index of `inner` under `outer` if already allocated.
    pub fn get(&self, outer: &BlockKey, inner: usize) -> Option<usize> {
        self.scopes.get(outer)?.get(&inner)
    }

    /// Number of sub-indices allocated under `outer`.
    pub fn len(&self, outer: &BlockKey) -> usize {
        self.scopes.get(outer).map_or(0, |scope| scope.len())
    }
}
