pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod receiver_tracker;
pub(crate) mod strategy;

mod max;
mod min;
mod tagged;
mod unicast;

pub use config::{
    FlowControlConfig, GroupConfig, StrategyKind, INITIAL_WINDOW_LENGTH_DEFAULT,
    MAX_RECEIVERS_DEFAULT, RECEIVER_TIMEOUT_DEFAULT_NS,
};
pub use error::FlowControlError;
pub use max::MaxMulticastFlowControl;
pub use min::MinMulticastFlowControl;
pub use receiver_tracker::{ReceiverEntry, ReceiverTracker};
pub use strategy::{FlowControl, FlowControlStrategy};
pub use tagged::TaggedMulticastFlowControl;
pub use unicast::UnicastFlowControl;
