use crate::types::{GroupTag, TimeNs};

use super::error::FlowControlError;

/// Receivers silent for longer than this are evicted on idle ticks.
pub const RECEIVER_TIMEOUT_DEFAULT_NS: TimeNs = 2_000_000_000;
/// Window granted ahead of the sender's own position while no receiver gates
/// the stream.
pub const INITIAL_WINDOW_LENGTH_DEFAULT: i32 = 128 * 1024;
/// Upper bound on tracked receivers per stream.
pub const MAX_RECEIVERS_DEFAULT: usize = 1024;

/// Which flow control variant gates an outgoing stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Max of right edges from a single peer, no receiver tracking
    Unicast,
    /// Advance with the fastest live receiver, let slower ones retransmit
    MulticastMax,
    /// Gate on the slowest live receiver
    MulticastMin,
    /// Gate on the slowest live receiver within a required group
    TaggedMin,
}

impl StrategyKind {
    /// Looks up a strategy by the name carried in channel configuration.
    pub fn from_name(name: &str) -> Result<Self, FlowControlError> {
        match name {
            "unicast" => Ok(Self::Unicast),
            "max" => Ok(Self::MulticastMax),
            "min" => Ok(Self::MulticastMin),
            "tagged" => Ok(Self::TaggedMin),
            _ => Err(FlowControlError::UnknownStrategy {
                name: name.to_string(),
            }),
        }
    }
}

/// Receiver group requirements for the tagged strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupConfig {
    /// Tag a receiver must report to participate in the limit computation
    pub tag: GroupTag,
    /// Tagged receivers required before the group gates the stream
    pub min_size: usize,
}

impl GroupConfig {
    pub fn new(tag: GroupTag) -> Self {
        Self { tag, min_size: 0 }
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }
}

/// Flow control settings for one outgoing stream, immutable after creation.
#[derive(Clone, Debug)]
pub struct FlowControlConfig {
    pub strategy: StrategyKind,
    pub receiver_timeout_ns: TimeNs,
    pub initial_window_length: i32,
    pub max_receivers: usize,
    /// Required for [`StrategyKind::TaggedMin`], ignored otherwise
    pub group: Option<GroupConfig>,
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Unicast,
            receiver_timeout_ns: RECEIVER_TIMEOUT_DEFAULT_NS,
            initial_window_length: INITIAL_WINDOW_LENGTH_DEFAULT,
            max_receivers: MAX_RECEIVERS_DEFAULT,
            group: None,
        }
    }
}

impl FlowControlConfig {
    /// Builds a configuration from the strategy descriptor carried in channel
    /// configuration: `"unicast"`, `"max"`, `"min"`, or
    /// `"tagged,g:<tag>[/<min group size>]"`.
    ///
    /// # Errors
    /// Returns `UnknownStrategy` for an unrecognized name, `MissingGroupTag`
    /// when the tagged strategy has no group clause, and `InvalidGroupClause`
    /// when the clause does not parse.
    pub fn from_descriptor(descriptor: &str) -> Result<Self, FlowControlError> {
        let mut parts = descriptor.split(',');
        let name = parts.next().unwrap_or_default();
        let strategy = StrategyKind::from_name(name)?;

        let mut group = None;
        if let Some(clause) = parts.next() {
            group = Some(parse_group_clause(clause)?);
        }

        if strategy == StrategyKind::TaggedMin && group.is_none() {
            return Err(FlowControlError::MissingGroupTag);
        }

        Ok(Self {
            strategy,
            group,
            ..Self::default()
        })
    }
}

// "g:<tag>" or "g:<tag>/<min group size>"
fn parse_group_clause(clause: &str) -> Result<GroupConfig, FlowControlError> {
    let invalid = || FlowControlError::InvalidGroupClause {
        clause: clause.to_string(),
    };

    let body = clause.strip_prefix("g:").ok_or_else(invalid)?;
    let (tag, min_size) = match body.split_once('/') {
        Some((tag, min_size)) => (tag, Some(min_size)),
        None => (body, None),
    };

    let tag: GroupTag = tag.parse().map_err(|_| invalid())?;
    let mut config = GroupConfig::new(tag);
    if let Some(min_size) = min_size {
        config = config.with_min_size(min_size.parse().map_err(|_| invalid())?);
    }

    Ok(config)
}

#[cfg(test)]
mod descriptor_tests {
    use super::{FlowControlConfig, FlowControlError, StrategyKind};

    #[test]
    fn named_strategies() {
        for (name, kind) in [
            ("unicast", StrategyKind::Unicast),
            ("max", StrategyKind::MulticastMax),
            ("min", StrategyKind::MulticastMin),
        ] {
            let config = FlowControlConfig::from_descriptor(name).unwrap();
            assert_eq!(config.strategy, kind);
            assert_eq!(config.group, None);
        }
    }

    #[test]
    fn tagged_with_group() {
        let config = FlowControlConfig::from_descriptor("tagged,g:123").unwrap();
        assert_eq!(config.strategy, StrategyKind::TaggedMin);

        let group = config.group.unwrap();
        assert_eq!(group.tag, 123);
        assert_eq!(group.min_size, 0);
    }

    #[test]
    fn tagged_with_group_and_min_size() {
        let config = FlowControlConfig::from_descriptor("tagged,g:-7/3").unwrap();

        let group = config.group.unwrap();
        assert_eq!(group.tag, -7);
        assert_eq!(group.min_size, 3);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result = FlowControlConfig::from_descriptor("fastest");
        assert_eq!(
            result.unwrap_err(),
            FlowControlError::UnknownStrategy {
                name: "fastest".to_string()
            }
        );
    }

    #[test]
    fn tagged_without_group_is_rejected() {
        let result = FlowControlConfig::from_descriptor("tagged");
        assert_eq!(result.unwrap_err(), FlowControlError::MissingGroupTag);
    }

    #[test]
    fn malformed_group_clause_is_rejected() {
        for descriptor in ["tagged,123", "tagged,g:", "tagged,g:abc", "tagged,g:1/x"] {
            assert!(matches!(
                FlowControlConfig::from_descriptor(descriptor),
                Err(FlowControlError::InvalidGroupClause { .. })
            ));
        }
    }
}
