use std::collections::HashMap;

use log::{debug, warn};

use crate::types::{GroupTag, Position, ReceiverId, TimeNs};

/// Live state for one receiver, built up from its status messages.
#[derive(Debug, Clone)]
pub struct ReceiverEntry {
    receiver_id: ReceiverId,
    last_position: Position,
    window_length: i32,
    last_activity_time_ns: TimeNs,
    group_tag: Option<GroupTag>,
}

impl ReceiverEntry {
    pub fn receiver_id(&self) -> ReceiverId {
        self.receiver_id
    }

    /// Highest consumption position this receiver has reported
    pub fn last_position(&self) -> Position {
        self.last_position
    }

    /// Window length from the receiver's most recent status message
    pub fn window_length(&self) -> i32 {
        self.window_length
    }

    pub fn last_activity_time_ns(&self) -> TimeNs {
        self.last_activity_time_ns
    }

    pub fn group_tag(&self) -> Option<GroupTag> {
        self.group_tag
    }

    /// The furthest position the sender may safely send to for this receiver
    pub fn right_edge(&self) -> Position {
        self.last_position + Position::from(self.window_length)
    }
}

/// Bounded collection of live receivers for the multicast strategies.
///
/// Entries live in a dense vec, keyed by receiver id through a side index,
/// so upserts stay amortized O(1) at multicast fan-out group sizes. Removal
/// swaps the tail entry into the vacated slot.
pub struct ReceiverTracker {
    entries: Vec<ReceiverEntry>,
    index_of: HashMap<ReceiverId, usize>,
    max_receivers: usize,
    capacity_evictions: u64,
}

impl ReceiverTracker {
    pub fn new(max_receivers: usize) -> Self {
        Self {
            entries: Vec::new(),
            index_of: HashMap::new(),
            max_receivers,
            capacity_evictions: 0,
        }
    }

    /// Records a status message from a receiver, creating an entry on first
    /// contact. Positions merge by max so an out-of-order or duplicate
    /// message never moves a receiver backwards; window and tag always take
    /// the latest report.
    pub fn on_status_message(
        &mut self,
        receiver_id: ReceiverId,
        position: Position,
        window_length: i32,
        group_tag: Option<GroupTag>,
        now_ns: TimeNs,
    ) {
        if let Some(&index) = self.index_of.get(&receiver_id) {
            let entry = &mut self.entries[index];
            entry.last_position = entry.last_position.max(position);
            entry.window_length = window_length;
            entry.group_tag = group_tag;
            entry.last_activity_time_ns = now_ns;
            return;
        }

        if self.entries.len() >= self.max_receivers {
            self.replace_least_recently_active();
        }

        debug!("tracking new receiver {}", receiver_id);
        self.index_of.insert(receiver_id, self.entries.len());
        self.entries.push(ReceiverEntry {
            receiver_id,
            last_position: position,
            window_length,
            last_activity_time_ns: now_ns,
            group_tag,
        });
    }

    /// Removes every entry silent for longer than `timeout_ns`, returning how
    /// many were evicted. Called from idle ticks only, so eviction latency is
    /// bounded by one duty-cycle interval.
    pub fn evict_stale(&mut self, now_ns: TimeNs, timeout_ns: TimeNs) -> usize {
        let mut evicted = 0;
        let mut index = 0;

        while index < self.entries.len() {
            if now_ns - self.entries[index].last_activity_time_ns > timeout_ns {
                let entry = self.remove_at(index);
                debug!(
                    "evicting receiver {} after {}ns of silence",
                    entry.receiver_id,
                    now_ns - entry.last_activity_time_ns
                );
                evicted += 1;
            } else {
                index += 1;
            }
        }

        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReceiverEntry> {
        self.entries.iter()
    }

    /// Times the tracker hit capacity and replaced a live entry
    pub fn capacity_evictions(&self) -> u64 {
        self.capacity_evictions
    }

    /// Smallest right edge across all live receivers
    pub fn min_right_edge(&self) -> Option<Position> {
        self.entries.iter().map(ReceiverEntry::right_edge).min()
    }

    /// Largest right edge across all live receivers
    pub fn max_right_edge(&self) -> Option<Position> {
        self.entries.iter().map(ReceiverEntry::right_edge).max()
    }

    /// Number of live receivers reporting the given group tag
    pub fn tagged_len(&self, tag: GroupTag) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.group_tag == Some(tag))
            .count()
    }

    /// Smallest right edge across live receivers reporting the given group tag
    pub fn min_right_edge_tagged(&self, tag: GroupTag) -> Option<Position> {
        self.entries
            .iter()
            .filter(|entry| entry.group_tag == Some(tag))
            .map(ReceiverEntry::right_edge)
            .min()
    }

    // A new receiver takes the slot of the least recently active one rather
    // than failing the send path when the tracker is full.
    fn replace_least_recently_active(&mut self) {
        let stalest = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| entry.last_activity_time_ns)
            .map(|(index, _)| index);

        if let Some(index) = stalest {
            let entry = self.remove_at(index);
            self.capacity_evictions += 1;
            warn!(
                "receiver tracker full ({} entries), replacing least recently active receiver {}",
                self.max_receivers, entry.receiver_id
            );
        }
    }

    fn remove_at(&mut self, index: usize) -> ReceiverEntry {
        let entry = self.entries.swap_remove(index);
        self.index_of.remove(&entry.receiver_id);
        if let Some(moved) = self.entries.get(index) {
            self.index_of.insert(moved.receiver_id, index);
        }
        entry
    }
}
