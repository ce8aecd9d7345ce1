//! # Sluice Driver
//! Sender-side flow control and stream position engine for the sluice
//! message transport.
//!
//! One [`SenderFlowControl`] instance gates one outgoing stream: receiver
//! status messages and duty-cycle idle ticks go in, a monotonic sender limit
//! comes out. The engine is single-threaded by contract, never blocks, and
//! never reads a clock of its own.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod flow_control;
mod protocol;
mod sender;
mod term_position;
mod types;

pub use flow_control::{
    FlowControl, FlowControlConfig, FlowControlError, FlowControlStrategy, GroupConfig,
    MaxMulticastFlowControl, MinMulticastFlowControl, ReceiverEntry, ReceiverTracker,
    StrategyKind, TaggedMulticastFlowControl, UnicastFlowControl,
    INITIAL_WINDOW_LENGTH_DEFAULT, MAX_RECEIVERS_DEFAULT, RECEIVER_TIMEOUT_DEFAULT_NS,
};
pub use protocol::{StatusMessage, END_OF_STREAM_FLAG};
pub use sender::{SenderFlowControl, SenderLimit};
pub use term_position::{
    compute_position, compute_term_id_from_position, compute_term_offset_from_position,
    position_bits_to_shift, StreamGeometry, StreamGeometryError, TERM_MAX_LENGTH,
    TERM_MIN_LENGTH,
};
pub use types::{GroupTag, Position, ReceiverId, TermId, TimeNs};
