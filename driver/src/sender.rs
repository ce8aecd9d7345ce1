use crate::flow_control::{FlowControl, FlowControlConfig, FlowControlError, FlowControlStrategy};
use crate::protocol::StatusMessage;
use crate::types::{Position, TermId, TimeNs};

/// The highest absolute position the send loop may currently transmit to.
///
/// Single point of truth for one stream's send gate, owned by the duty-cycle
/// thread that also runs the strategy. Updates are plain monotonic-max
/// assignments; no atomics are needed because reads happen only on the
/// writing thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderLimit {
    value: Position,
}

impl SenderLimit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Position {
        self.value
    }

    /// Applies a proposed limit, keeping the holder non-decreasing
    pub fn propose(&mut self, limit: Position) {
        if limit > self.value {
            self.value = limit;
        }
    }
}

/// Per-stream glue between inbound status feedback and the send loop.
///
/// Instantiated once at stream setup and destroyed with the stream. The duty
/// cycle drains decoded status messages into [`Self::on_status_message`] and
/// calls [`Self::on_idle`] once per tick; the send loop polls
/// [`Self::limit`] each iteration to bound outgoing data.
pub struct SenderFlowControl {
    strategy: FlowControlStrategy,
    limit: SenderLimit,
}

impl SenderFlowControl {
    /// Sets up flow control for a stream with the given geometry.
    ///
    /// # Errors
    /// Returns an error for invalid geometry or an incomplete strategy
    /// configuration; nothing past this point can fail.
    pub fn new(
        config: &FlowControlConfig,
        initial_term_id: TermId,
        term_buffer_length: i32,
    ) -> Result<Self, FlowControlError> {
        Ok(Self {
            strategy: FlowControlStrategy::for_stream(config, initial_term_id, term_buffer_length)?,
            limit: SenderLimit::new(),
        })
    }

    /// Feeds one decoded status message through the strategy and returns the
    /// updated limit.
    pub fn on_status_message(&mut self, status: &StatusMessage, now_ns: TimeNs) -> Position {
        let proposed = self
            .strategy
            .on_status_message(status, self.limit.get(), now_ns);
        self.limit.propose(proposed);

        self.limit.get()
    }

    /// Drives liveness eviction and idle advancement once per duty-cycle
    /// tick and returns the updated limit.
    pub fn on_idle(
        &mut self,
        now_ns: TimeNs,
        sender_position: Position,
        is_end_of_stream: bool,
    ) -> Position {
        let proposed =
            self.strategy
                .on_idle(now_ns, self.limit.get(), sender_position, is_end_of_stream);
        self.limit.propose(proposed);

        self.limit.get()
    }

    /// Current sender limit, polled by the send loop
    pub fn limit(&self) -> Position {
        self.limit.get()
    }

    /// Live receivers currently tracked by the stream's strategy
    pub fn receiver_count(&self) -> usize {
        self.strategy.receiver_count()
    }
}

#[cfg(test)]
mod sender_limit_tests {
    use super::SenderLimit;

    #[test]
    fn starts_at_zero() {
        assert_eq!(SenderLimit::new().get(), 0);
    }

    #[test]
    fn propose_is_monotonic() {
        let mut limit = SenderLimit::new();

        limit.propose(1000);
        assert_eq!(limit.get(), 1000);

        limit.propose(800);
        assert_eq!(limit.get(), 1000);

        limit.propose(1200);
        assert_eq!(limit.get(), 1200);
    }
}

#[cfg(test)]
mod sender_flow_control_tests {
    use crate::flow_control::{FlowControlConfig, GroupConfig, StrategyKind};
    use crate::protocol::StatusMessage;

    use super::SenderFlowControl;

    const SECOND_NS: i64 = 1_000_000_000;

    fn config(strategy: StrategyKind) -> FlowControlConfig {
        FlowControlConfig {
            strategy,
            initial_window_length: 1024,
            ..FlowControlConfig::default()
        }
    }

    #[test]
    fn unicast_stream_end_to_end() {
        let mut flow = SenderFlowControl::new(&config(StrategyKind::Unicast), 10, 65536).unwrap();
        assert_eq!(flow.limit(), 0);

        flow.on_status_message(&StatusMessage::new(1, 10, 0, 1000), 0);
        assert_eq!(flow.limit(), 1000);

        // Term rotation: consumption moves into term 11
        flow.on_status_message(&StatusMessage::new(1, 11, 100, 1000), SECOND_NS);
        assert_eq!(flow.limit(), 66636);
    }

    #[test]
    fn min_stream_tracks_group_and_liveness() {
        let mut flow =
            SenderFlowControl::new(&config(StrategyKind::MulticastMin), 0, 65536).unwrap();

        flow.on_status_message(&StatusMessage::new(1, 0, 0, 500), 0);
        flow.on_status_message(&StatusMessage::new(2, 0, 0, 2000), 0);
        assert_eq!(flow.limit(), 500);
        assert_eq!(flow.receiver_count(), 2);

        // Receiver 1 departs; only receiver 2 remains to gate the stream
        flow.on_status_message(&StatusMessage::new(2, 0, 0, 2000), 3 * SECOND_NS);
        flow.on_idle(4 * SECOND_NS, 400, false);
        assert_eq!(flow.receiver_count(), 1);
        assert_eq!(flow.limit(), 2000);
    }

    #[test]
    fn tagged_stream_from_descriptor() {
        let config = FlowControlConfig::from_descriptor("tagged,g:7/2").unwrap();
        let mut flow = SenderFlowControl::new(&config, 0, 65536).unwrap();

        flow.on_status_message(&StatusMessage::new(1, 0, 0, 300).with_group_tag(7), 0);
        assert_eq!(flow.limit(), 0);

        flow.on_status_message(&StatusMessage::new(2, 0, 0, 900).with_group_tag(7), 0);
        assert_eq!(flow.limit(), 300);
    }

    #[test]
    fn limit_is_monotonic_across_operations() {
        let mut flow =
            SenderFlowControl::new(&config(StrategyKind::MulticastMin), 0, 65536).unwrap();
        let mut last = flow.limit();

        flow.on_status_message(&StatusMessage::new(1, 0, 0, 800), 0);
        assert!(flow.limit() >= last);
        last = flow.limit();

        flow.on_status_message(&StatusMessage::new(1, 0, 0, 100), SECOND_NS);
        assert!(flow.limit() >= last);
        last = flow.limit();

        flow.on_idle(4 * SECOND_NS, 700, false);
        assert!(flow.limit() >= last);
        last = flow.limit();

        flow.on_idle(5 * SECOND_NS, 700, true);
        assert!(flow.limit() >= last);
        assert!(flow.limit() >= 700);
    }
}
