//! Deduplicated, locally addressable store of timeline items.

use crate::feeds::RawItem;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Session-local item number shown to the user and accepted by commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(u64);

impl LocalId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(LocalId)
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    local_id: LocalId,
    created_at: Option<DateTime<Utc>>,
    payload: RawItem,
    shown: bool,
}

impl Item {
    fn new(local_id: LocalId, payload: RawItem) -> Self {
        // A share is displayed with the time of the item it shares.
        let created_at = payload
            .shared()
            .map_or_else(|| payload.created_at(), RawItem::created_at);
        Self {
            local_id,
            created_at,
            payload,
            shown: false,
        }
    }

    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub fn remote_id(&self) -> u64 {
        self.payload.id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn is_shared(&self) -> bool {
        self.payload.shared().is_some()
    }

    pub fn original(&self) -> Option<&RawItem> {
        self.payload.shared()
    }

    /// The record whose content is displayed and addressed: the shared item
    /// for a share, the item itself otherwise.
    pub fn content(&self) -> &RawItem {
        self.original().unwrap_or(&self.payload)
    }

    pub fn payload(&self) -> &RawItem {
        &self.payload
    }

    pub fn shown(&self) -> bool {
        self.shown
    }

    /// Returns `true` only on the call that flips the flag.
    pub fn mark_shown(&mut self) -> bool {
        !std::mem::replace(&mut self.shown, true)
    }

    pub fn set_favorited(&mut self) {
        self.payload.favorited = true;
    }

    pub fn set_reposted(&mut self) {
        self.payload.retweeted = true;
    }
}

#[derive(Debug)]
pub struct ItemStore {
    items: Vec<Item>,
    by_local: HashMap<LocalId, usize>,
    by_remote: HashMap<u64, LocalId>,
    next_local_id: u64,
    cursor: Option<u64>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            by_local: HashMap::new(),
            by_remote: HashMap::new(),
            next_local_id: 1,
            cursor: None,
        }
    }

    /// Largest remote id ingested from the timeline so far.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts every item of `batch` not already present, in the given order,
    /// and advances the cursor to the largest remote id in the batch.
    /// Returns the newly inserted items.
    pub fn ingest(&mut self, batch: Vec<RawItem>) -> &[Item] {
        let start = self.items.len();
        if let Some(max_id) = batch.iter().map(|raw| raw.id).max() {
            self.cursor = Some(self.cursor.map_or(max_id, |c| c.max(max_id)));
        }
        for raw in batch {
            self.insert(raw);
        }
        &self.items[start..]
    }

    /// Inserts a single item obtained outside the timeline (ancestor lookup).
    /// The cursor does not move. Returns the local id, existing or new.
    pub fn adopt(&mut self, raw: RawItem) -> LocalId {
        self.insert(raw)
    }

    fn insert(&mut self, raw: RawItem) -> LocalId {
        if let Some(&existing) = self.by_remote.get(&raw.id) {
            return existing;
        }
        let local_id = LocalId(self.next_local_id);
        self.next_local_id += 1;

        self.by_remote.insert(raw.id, local_id);
        self.by_local.insert(local_id, self.items.len());
        self.items.push(Item::new(local_id, raw));
        local_id
    }

    pub fn get(&self, local_id: LocalId) -> Option<&Item> {
        self.by_local.get(&local_id).map(|&idx| &self.items[idx])
    }

    pub fn get_mut(&mut self, local_id: LocalId) -> Option<&mut Item> {
        let idx = *self.by_local.get(&local_id)?;
        self.items.get_mut(idx)
    }

    pub fn find_remote(&self, remote_id: u64) -> Option<LocalId> {
        self.by_remote.get(&remote_id).copied()
    }

    pub fn unshown_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(|item| !item.shown)
    }

    pub fn unshown_items_mut(&mut self) -> impl Iterator<Item = &mut Item> + '_ {
        self.items.iter_mut().filter(|item| !item.shown)
    }

    pub fn mark_shown(&mut self, local_id: LocalId) -> bool {
        self.get_mut(local_id).is_some_and(Item::mark_shown)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }
}
