use crate::protocol::StatusMessage;
use crate::term_position::StreamGeometry;
use crate::types::{Position, TimeNs};

use super::config::FlowControlConfig;
use super::receiver_tracker::ReceiverTracker;
use super::strategy::FlowControl;

/// Multicast sender flow control that advances with the fastest live
/// receiver.
///
/// Slower receivers fall behind and are expected to recover through
/// retransmission. Same tracking, eviction, and fallback behavior as the min
/// strategy; only the candidate changes to the maximum right edge.
pub struct MaxMulticastFlowControl {
    geometry: StreamGeometry,
    receivers: ReceiverTracker,
    receiver_timeout_ns: TimeNs,
    initial_window_length: i32,
    last_limit: Position,
}

impl MaxMulticastFlowControl {
    pub fn new(geometry: StreamGeometry, config: &FlowControlConfig) -> Self {
        Self {
            geometry,
            receivers: ReceiverTracker::new(config.max_receivers),
            receiver_timeout_ns: config.receiver_timeout_ns,
            initial_window_length: config.initial_window_length,
            last_limit: 0,
        }
    }

    pub fn receivers(&self) -> &ReceiverTracker {
        &self.receivers
    }
}

impl FlowControl for MaxMulticastFlowControl {
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

        let candidate = self.receivers.max_right_edge().unwrap_or(self.last_limit);
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

        let candidate = match self.receivers.max_right_edge() {
            Some(edge) => edge,
            None => sender_position + Position::from(self.initial_window_length),
        };

        let mut next = self.last_limit.max(sender_limit).max(candidate);
        if is_end_of_stream {
            next = next.max(sender_position);
        }
        self.last_limit = next;

        self.last_limit
    }
}
