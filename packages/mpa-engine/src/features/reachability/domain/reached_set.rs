/*
 * Reached Set & Waitlist
 *
 * Arena of (state, precision) entries addressed by `StateId`, indexed by
 * program location. The waitlist holds ids of entries still to be
 * expanded; removed entries are skipped lazily when popped.
 */

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::WaitlistOrder;
use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::shared::models::NodeId;

/// Handle of a reached-set entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    state: AbstractState,
    precision: Precision,
}

#[derive(Debug, Clone)]
pub struct ReachedSet {
    entries: Vec<Option<Entry>>,
    by_location: FxHashMap<Option<NodeId>, Vec<StateId>>,
    waitlist: VecDeque<StateId>,
    waiting: FxHashSet<StateId>,
    order: WaitlistOrder,
    first: Option<StateId>,
    last: Option<StateId>,
    len: usize,
}

impl Default for ReachedSet {
    fn default() -> Self {
        Self::new(WaitlistOrder::Bfs)
    }
}

impl ReachedSet {
    pub fn new(order: WaitlistOrder) -> Self {
        Self {
            entries: Vec::new(),
            by_location: FxHashMap::default(),
            waitlist: VecDeque::new(),
            waiting: FxHashSet::default(),
            order,
            first: None,
            last: None,
            len: 0,
        }
    }

    pub fn order(&self) -> WaitlistOrder {
        self.order
    }

    /// Add a state and put it on the waitlist
    pub fn add(&mut self, state: AbstractState, precision: Precision) -> StateId {
        let id = StateId(self.entries.len());
        self.by_location
            .entry(state.location())
            .or_default()
            .push(id);
        self.entries.push(Some(Entry { state, precision }));
        self.len += 1;
        self.first.get_or_insert(id);
        self.last = Some(id);
        self.push_waiting(id);
        id
    }

    /// Put an existing entry back on the waitlist
    pub fn re_add_to_waitlist(&mut self, id: StateId) -> Result<()> {
        if !self.contains(id) {
            return Err(MpaError::usage(format!("state {} is not reached", id.0)));
        }
        self.push_waiting(id);
        Ok(())
    }

    fn push_waiting(&mut self, id: StateId) {
        if self.waiting.insert(id) {
            self.waitlist.push_back(id);
        }
    }

    /// Remove an entry from the reached set and the waitlist
    pub fn remove(&mut self, id: StateId) -> Option<(AbstractState, Precision)> {
        let entry = self.entries.get_mut(id.0)?.take()?;
        if let Some(ids) = self.by_location.get_mut(&entry.state.location()) {
            ids.retain(|other| *other != id);
        }
        self.waiting.remove(&id);
        self.len -= 1;
        if self.last == Some(id) {
            self.last = None;
        }
        if self.first == Some(id) {
            self.first = None;
        }
        Some((entry.state, entry.precision))
    }

    /// Replace `id` by a new entry (merge result); the new entry is waiting
    pub fn replace(
        &mut self,
        id: StateId,
        state: AbstractState,
        precision: Precision,
    ) -> Result<StateId> {
        if self.remove(id).is_none() {
            return Err(MpaError::usage(format!("state {} is not reached", id.0)));
        }
        Ok(self.add(state, precision))
    }

    /// Next waiting entry (front for BFS, back for DFS)
    pub fn pop_from_waitlist(&mut self) -> Option<StateId> {
        loop {
            let id = match self.order {
                WaitlistOrder::Bfs => self.waitlist.pop_front()?,
                WaitlistOrder::Dfs => self.waitlist.pop_back()?,
            };
            if self.waiting.remove(&id) {
                return Some(id);
            }
        }
    }

    pub fn has_waiting_state(&self) -> bool {
        !self.waiting.is_empty()
    }

    pub fn waitlist_len(&self) -> usize {
        self.waiting.len()
    }

    /// Ids on the waitlist, in waitlist order
    pub fn waitlist(&self) -> Vec<StateId> {
        self.waitlist
            .iter()
            .copied()
            .filter(|id| self.waiting.contains(id))
            .collect()
    }

    pub fn contains(&self, id: StateId) -> bool {
        matches!(self.entries.get(id.0), Some(Some(_)))
    }

    pub fn state(&self, id: StateId) -> Option<&AbstractState> {
        self.entries.get(id.0)?.as_ref().map(|e| &e.state)
    }

    pub fn precision(&self, id: StateId) -> Option<&Precision> {
        self.entries.get(id.0)?.as_ref().map(|e| &e.precision)
    }

    /// Replace the precision of an entry in place
    pub fn update_precision(&mut self, id: StateId, precision: Precision) -> Result<()> {
        match self.entries.get_mut(id.0) {
            Some(Some(entry)) => {
                entry.precision = precision;
                Ok(())
            }
            _ => Err(MpaError::usage(format!("state {} is not reached", id.0))),
        }
    }

    /// Apply `update` to the precision of every waiting entry
    pub fn update_waitlist_precisions<F>(&mut self, mut update: F)
    where
        F: FnMut(&Precision) -> Precision,
    {
        for id in self.waiting.iter() {
            if let Some(Some(entry)) = self.entries.get_mut(id.0) {
                entry.precision = update(&entry.precision);
            }
        }
    }

    /// Entries at `location`, oldest first
    pub fn reached_at(&self, location: Option<NodeId>) -> &[StateId] {
        self.by_location
            .get(&location)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// First added entry still present
    pub fn first_state(&self) -> Option<StateId> {
        self.first
    }

    /// Last added entry still present
    pub fn last_state(&self) -> Option<StateId> {
        self.last
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &AbstractState, &Precision)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (StateId(i), &e.state, &e.precision)))
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.order);
    }
}
