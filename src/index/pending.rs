// ABOUTME: Pending block set - per item id, the block indices currently open
// ABOUTME: between a "part added" event and its matching "part done".

use std::collections::{BTreeSet, HashMap};

use crate::error::ProtocolError;

#[derive(Debug, Clone, Default)]
pub struct PendingBlocks {
    open: HashMap<String, BTreeSet<usize>>,
}

impl PendingBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index` as open for `item_id`.
    pub fn open(&mut self, item_id: &str, index: usize) {
        self.open.entry(item_id.to_string()).or_default().insert(index);
    }

    /// Close `index` for `item_id`. Fails if it was not open.
    pub fn close(&mut self, item_id: &str, index: usize) -> Result<(), ProtocolError> {
        let removed = self
            .open
            .get_mut(item_id)
            .is_some_and(|set| set.remove(&index));
        if !removed {
            return Err(ProtocolError::NoProcessingIndex {
                item_id: item_id.to_string(),
                index,
            });
        }
        Ok(())
    }

    /// Finish `item_id`, returning any indices still open.
    ///
    /// Fails if the item never had an open part.
    pub fn finish(&mut self, item_id: &str) -> Result<BTreeSet<usize>, ProtocolError> {
        self.open
            .remove(item_id)
            .ok_or_else(|| ProtocolError::ItemNotFound(item_id.to_string()))
    }

    pub fn is_open(&self, item_id: &str, index: usize) -> bool {
        self.open.get(item_id).is_some_and(|set| set.contains(&index))
    }
}
