use crate::protocol::StatusMessage;
use crate::term_position::StreamGeometry;
use crate::types::{Position, TermId, TimeNs};

use super::config::{FlowControlConfig, StrategyKind};
use super::error::FlowControlError;
use super::max::MaxMulticastFlowControl;
use super::min::MinMulticastFlowControl;
use super::tagged::TaggedMulticastFlowControl;
use super::unicast::UnicastFlowControl;

/// Sender-side flow control contract shared by every strategy variant.
///
/// Both operations return the new sender limit. Every returned value is `>=`
/// the value most recently returned by the same instance, regardless of the
/// call interleaving: the limit a strategy has granted is never taken back.
/// Time is always supplied by the calling duty cycle.
pub trait FlowControl {
    /// Processes one decoded status message and returns the new sender limit.
    fn on_status_message(
        &mut self,
        status: &StatusMessage,
        sender_limit: Position,
        now_ns: TimeNs,
    ) -> Position;

    /// Called once per duty-cycle tick. Evicts stale receivers where the
    /// variant tracks them and returns the new sender limit. When
    /// `is_end_of_stream` is set the returned limit reaches at least
    /// `sender_position` so end-of-stream framing can be flushed.
    fn on_idle(
        &mut self,
        now_ns: TimeNs,
        sender_limit: Position,
        sender_position: Position,
        is_end_of_stream: bool,
    ) -> Position;
}

/// Flow control variant for one outgoing stream, selected at stream creation.
///
/// Dispatch is a static `match`; the send path never pays for an indirect
/// call or an allocation.
pub enum FlowControlStrategy {
    Unicast(UnicastFlowControl),
    MulticastMax(MaxMulticastFlowControl),
    MulticastMin(MinMulticastFlowControl),
    TaggedMin(TaggedMulticastFlowControl),
}

impl FlowControlStrategy {
    /// Sets up flow control for a stream: validates geometry, derives the
    /// position shift, and builds the configured variant. Called exactly once
    /// when the stream is created, before any status message is processed.
    ///
    /// # Errors
    /// Returns an error for invalid geometry or for a tagged strategy with no
    /// configured group.
    pub fn for_stream(
        config: &FlowControlConfig,
        initial_term_id: TermId,
        term_buffer_length: i32,
    ) -> Result<Self, FlowControlError> {
        let geometry = StreamGeometry::new(initial_term_id, term_buffer_length)?;
        Self::from_config(config, geometry)
    }

    /// Builds the variant named by `config` for already-validated geometry.
    pub fn from_config(
        config: &FlowControlConfig,
        geometry: StreamGeometry,
    ) -> Result<Self, FlowControlError> {
        match config.strategy {
            StrategyKind::Unicast => Ok(Self::Unicast(UnicastFlowControl::new(geometry))),
            StrategyKind::MulticastMax => {
                Ok(Self::MulticastMax(MaxMulticastFlowControl::new(geometry, config)))
            }
            StrategyKind::MulticastMin => {
                Ok(Self::MulticastMin(MinMulticastFlowControl::new(geometry, config)))
            }
            StrategyKind::TaggedMin => {
                let group = config.group.ok_or(FlowControlError::MissingGroupTag)?;
                Ok(Self::TaggedMin(TaggedMulticastFlowControl::new(
                    geometry, config, group,
                )))
            }
        }
    }

    /// Live receivers currently tracked by this strategy
    pub fn receiver_count(&self) -> usize {
        match self {
            Self::Unicast(_) => 0,
            Self::MulticastMax(strategy) => strategy.receivers().len(),
            Self::MulticastMin(strategy) => strategy.receivers().len(),
            Self::TaggedMin(strategy) => strategy.receivers().len(),
        }
    }
}

impl FlowControl for FlowControlStrategy {
    fn on_status_message(
        &mut self,
        status: &StatusMessage,
        sender_limit: Position,
        now_ns: TimeNs,
    ) -> Position {
        match self {
            Self::Unicast(strategy) => strategy.on_status_message(status, sender_limit, now_ns),
            Self::MulticastMax(strategy) => strategy.on_status_message(status, sender_limit, now_ns),
            Self::MulticastMin(strategy) => strategy.on_status_message(status, sender_limit, now_ns),
            Self::TaggedMin(strategy) => strategy.on_status_message(status, sender_limit, now_ns),
        }
    }

    fn on_idle(
        &mut self,
        now_ns: TimeNs,
        sender_limit: Position,
        sender_position: Position,
        is_end_of_stream: bool,
    ) -> Position {
        match self {
            Self::Unicast(strategy) => {
                strategy.on_idle(now_ns, sender_limit, sender_position, is_end_of_stream)
            }
            Self::MulticastMax(strategy) => {
                strategy.on_idle(now_ns, sender_limit, sender_position, is_end_of_stream)
            }
            Self::MulticastMin(strategy) => {
                strategy.on_idle(now_ns, sender_limit, sender_position, is_end_of_stream)
            }
            Self::TaggedMin(strategy) => {
                strategy.on_idle(now_ns, sender_limit, sender_position, is_end_of_stream)
            }
        }
    }
}

#[cfg(test)]
mod strategy_selection_tests {
    use crate::flow_control::config::{FlowControlConfig, GroupConfig, StrategyKind};
    use crate::flow_control::error::FlowControlError;

    use super::FlowControlStrategy;

    fn config(strategy: StrategyKind) -> FlowControlConfig {
        FlowControlConfig {
            strategy,
            ..FlowControlConfig::default()
        }
    }

    #[test]
    fn builds_each_variant() {
        for kind in [
            StrategyKind::Unicast,
            StrategyKind::MulticastMax,
            StrategyKind::MulticastMin,
        ] {
            let strategy = FlowControlStrategy::for_stream(&config(kind), 0, 65536).unwrap();
            assert_eq!(strategy.receiver_count(), 0);
        }

        let mut tagged = config(StrategyKind::TaggedMin);
        tagged.group = Some(GroupConfig::new(1));
        assert!(FlowControlStrategy::for_stream(&tagged, 0, 65536).is_ok());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let result = FlowControlStrategy::for_stream(&config(StrategyKind::Unicast), 0, 1000);
        assert!(matches!(result, Err(FlowControlError::Geometry(_))));
    }

    #[test]
    fn tagged_without_group_is_rejected() {
        let result = FlowControlStrategy::for_stream(&config(StrategyKind::TaggedMin), 0, 65536);
        assert!(matches!(result, Err(FlowControlError::MissingGroupTag)));
    }
}
