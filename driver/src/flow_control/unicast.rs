use crate::protocol::StatusMessage;
use crate::term_position::StreamGeometry;
use crate::types::{Position, TimeNs};

use super::strategy::FlowControl;

/// Default unicast sender flow control.
///
/// Max of right edges; no tracking of receivers. A single consumer's
/// advertised window directly bounds how far ahead the sender may write, and
/// liveness of that one peer is the network layer's concern.
pub struct UnicastFlowControl {
    geometry: StreamGeometry,
    last_position: Position,
}

impl UnicastFlowControl {
    pub fn new(geometry: StreamGeometry) -> Self {
        Self {
            geometry,
            last_position: 0,
        }
    }

    /// Highest consumption position the peer has reported so far
    pub fn last_position(&self) -> Position {
        self.last_position
    }
}

impl FlowControl for UnicastFlowControl {
    fn on_status_message(
        &mut self,
        status: &StatusMessage,
        sender_limit: Position,
        _now_ns: TimeNs,
    ) -> Position {
        let position = self
            .geometry
            .position(status.consumption_term_id, status.consumption_term_offset);

        self.last_position = self.last_position.max(position);

        sender_limit.max(position + Position::from(status.receiver_window_length))
    }

    fn on_idle(
        &mut self,
        _now_ns: TimeNs,
        sender_limit: Position,
        _sender_position: Position,
        _is_end_of_stream: bool,
    ) -> Position {
        sender_limit
    }
}
