use crate::protocol::StatusMessage;
use crate::term_position::StreamGeometry;
use crate::types::{GroupTag, Position, TimeNs};

use super::config::{FlowControlConfig, GroupConfig};
use super::receiver_tracker::ReceiverTracker;
use super::strategy::FlowControl;

/// Multicast sender flow control gated on the slowest receiver within a
/// required group.
///
/// Only receivers reporting the configured tag participate in the limit
/// computation; every receiver is still tracked for liveness and accounting.
/// Until `min_size` tagged receivers are live the group does not gate the
/// stream, so a partially-joined required set cannot stall the sender.
pub struct TaggedMulticastFlowControl {
    geometry: StreamGeometry,
    receivers: ReceiverTracker,
    receiver_timeout_ns: TimeNs,
    initial_window_length: i32,
    group_tag: GroupTag,
    group_min_size: usize,
    last_limit: Position,
}

impl TaggedMulticastFlowControl {
    pub fn new(geometry: StreamGeometry, config: &FlowControlConfig, group: GroupConfig) -> Self {
        Self {
            geometry,
            receivers: ReceiverTracker::new(config.max_receivers),
            receiver_timeout_ns: config.receiver_timeout_ns,
            initial_window_length: config.initial_window_length,
            group_tag: group.tag,
            group_min_size: group.min_size,
            last_limit: 0,
        }
    }

    pub fn receivers(&self) -> &ReceiverTracker {
        &self.receivers
    }

    pub fn group_tag(&self) -> GroupTag {
        self.group_tag
    }

    // The group gates only once enough tagged receivers are live
    fn group_candidate(&self) -> Option<Position> {
        if self.receivers.tagged_len(self.group_tag) < self.group_min_size {
            return None;
        }
        self.receivers.min_right_edge_tagged(self.group_tag)
    }
}

impl FlowControl for TaggedMulticastFlowControl {
    fn on_status_message(
        &mut self,
        status: &StatusMessage,
        sender_limit: Position,
        now_ns: TimeNs,
    ) -> Position {
        let position = self
            .geometry
            .position(status.consumption_term_id, status.consumption_term_offset);

        self.receivers.on_status_message(
            status.receiver_id,
            position,
            status.receiver_window_length,
            status.group_tag,
            now_ns,
        );

        let candidate = self.group_candidate().unwrap_or(self.last_limit);
        self.last_limit = self.last_limit.max(sender_limit).max(candidate);

        self.last_limit
    }

    fn on_idle(
        &mut self,
        now_ns: TimeNs,
        sender_limit: Position,
        sender_position: Position,
        is_end_of_stream: bool,
    ) -> Position {
        self.receivers.evict_stale(now_ns, self.receiver_timeout_ns);

        let candidate = self
            .group_candidate()
            .unwrap_or(sender_position + Position::from(self.initial_window_length));

        let mut next = self.last_limit.max(sender_limit).max(candidate);
        if is_end_of_stream {
            next = next.max(sender_position);
        }
        self.last_limit = next;

        self.last_limit
    }
}
