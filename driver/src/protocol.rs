// Decoded view of receiver-to-sender status feedback. The network layer
// owns wire framing; flow control only reads the fields carried here.

use crate::types::{GroupTag, ReceiverId, TermId};

/// Flag bit set when the receiver has observed end-of-stream.
pub const END_OF_STREAM_FLAG: u8 = 0b1000_0000;

/// Periodic feedback from one receiver reporting its consumption progress
/// and how many bytes it is willing to buffer ahead of that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub receiver_id: ReceiverId,
    pub consumption_term_id: TermId,
    /// Offset within the consumption term, in `[0, term_buffer_length)`
    pub consumption_term_offset: i32,
    /// Bytes the receiver will buffer ahead of its consumption point, `>= 0`
    pub receiver_window_length: i32,
    /// Present only when the receiver belongs to a flow control group
    pub group_tag: Option<GroupTag>,
    pub flags: u8,
}

impl StatusMessage {
    pub fn new(
        receiver_id: ReceiverId,
        consumption_term_id: TermId,
        consumption_term_offset: i32,
        receiver_window_length: i32,
    ) -> Self {
        Self {
            receiver_id,
            consumption_term_id,
            consumption_term_offset,
            receiver_window_length,
            group_tag: None,
            flags: 0,
        }
    }

    pub fn with_group_tag(mut self, group_tag: GroupTag) -> Self {
        self.group_tag = Some(group_tag);
        self
    }

    /// Whether the receiver signaled end-of-stream in this message
    pub fn is_end_of_stream(&self) -> bool {
        self.flags & END_OF_STREAM_FLAG != 0
    }
}

#[cfg(test)]
mod status_message_tests {
    use super::{StatusMessage, END_OF_STREAM_FLAG};

    #[test]
    fn end_of_stream_flag() {
        let mut status = StatusMessage::new(1, 0, 0, 4096);
        assert!(!status.is_end_of_stream());

        status.flags |= END_OF_STREAM_FLAG;
        assert!(status.is_end_of_stream());
    }

    #[test]
    fn group_tag_defaults_to_absent() {
        let status = StatusMessage::new(1, 0, 0, 4096);
        assert_eq!(status.group_tag, None);

        let tagged = status.with_group_tag(99);
        assert_eq!(tagged.group_tag, Some(99));
    }
}
