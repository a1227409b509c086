//! The flow table: single owner of all per-flow state.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use super::{FlowKey, FlowRecord};

/// Mapping from [`FlowKey`] to [`FlowRecord`].
///
/// Holds at most one record per key and never evicts: entries live for
/// the duration of the observation window, so memory grows only with the
/// number of distinct flows seen inside it.
#[derive(Debug, Default)]
pub struct FlowTable {
    flows: HashMap<FlowKey, FlowRecord>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `key`, inserting a zeroed record with
    /// `start_time = now` on first sight. Idempotent for existing keys:
    /// the lookup itself never mutates a record, and `now` is ignored
    /// once the record exists.
    pub fn get_or_create(&mut self, key: &FlowKey, now: DateTime<Local>) -> &mut FlowRecord {
        self.flows
            .entry(key.clone())
            .or_insert_with(|| FlowRecord::new(now))
    }

    pub fn get(&self, key: &FlowKey) -> Option<&FlowRecord> {
        self.flows.get(key)
    }

    /// Number of distinct flows observed so far.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
