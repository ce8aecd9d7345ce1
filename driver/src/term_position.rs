use thiserror::Error;

use crate::types::{Position, TermId};

/// Smallest term buffer length a stream may be created with, in bytes.
pub const TERM_MIN_LENGTH: i32 = 64 * 1024;
/// Largest term buffer length a stream may be created with, in bytes.
pub const TERM_MAX_LENGTH: i32 = 1024 * 1024 * 1024;

/// Errors that can occur while validating stream geometry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamGeometryError {
    /// Term buffer length is not a power of two in the permitted range.
    /// Rejected when the stream is created, never during steady state.
    #[error("term buffer length {length} must be a power of two between 64 KiB and 1 GiB")]
    InvalidTermLength { length: i32 },
}

/// Returns the number of bits to shift when converting between a term count
/// and an absolute position, for a validated power-of-two term length.
pub fn position_bits_to_shift(term_buffer_length: i32) -> u32 {
    term_buffer_length.trailing_zeros()
}

/// Computes the absolute stream position for a (term id, term offset) pair.
///
/// Term ids advance by exactly one per rotation, so the wrapping difference
/// from the initial term id recovers a correct 64-bit position even after the
/// id itself wraps its signed 32-bit range. The subtraction is an explicit
/// `wrapping_sub`, sign-extended before the shift.
///
/// # Examples
/// ```
/// # use sluice_driver::compute_position;
/// assert_eq!(compute_position(10, 0, 16, 10), 0);
/// assert_eq!(compute_position(11, 100, 16, 10), 65636);
/// ```
pub fn compute_position(
    active_term_id: TermId,
    term_offset: i32,
    position_bits_to_shift: u32,
    initial_term_id: TermId,
) -> Position {
    let term_count = i64::from(active_term_id.wrapping_sub(initial_term_id));

    (term_count << position_bits_to_shift) + i64::from(term_offset)
}

/// Computes the term id that contains the given absolute position.
///
/// Inverse of [`compute_position`] for the term component.
pub fn compute_term_id_from_position(
    position: Position,
    position_bits_to_shift: u32,
    initial_term_id: TermId,
) -> TermId {
    ((position >> position_bits_to_shift) as TermId).wrapping_add(initial_term_id)
}

/// Computes the offset within a term for the given absolute position.
///
/// Inverse of [`compute_position`] for the offset component.
pub fn compute_term_offset_from_position(position: Position, position_bits_to_shift: u32) -> i32 {
    let mask = (1i64 << position_bits_to_shift) - 1;

    (position & mask) as i32
}

/// Immutable geometry of one stream's log buffer, fixed at stream creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    initial_term_id: TermId,
    term_buffer_length: i32,
    position_bits_to_shift: u32,
}

impl StreamGeometry {
    /// Validates the term buffer length and precomputes the position shift.
    ///
    /// # Errors
    /// Returns `StreamGeometryError::InvalidTermLength` if the length is not
    /// a power of two between [`TERM_MIN_LENGTH`] and [`TERM_MAX_LENGTH`].
    pub fn new(initial_term_id: TermId, term_buffer_length: i32) -> Result<Self, StreamGeometryError> {
        if term_buffer_length < TERM_MIN_LENGTH
            || term_buffer_length > TERM_MAX_LENGTH
            || term_buffer_length.count_ones() != 1
        {
            return Err(StreamGeometryError::InvalidTermLength {
                length: term_buffer_length,
            });
        }

        Ok(Self {
            initial_term_id,
            term_buffer_length,
            position_bits_to_shift: position_bits_to_shift(term_buffer_length),
        })
    }

    pub fn initial_term_id(&self) -> TermId {
        self.initial_term_id
    }

    pub fn term_buffer_length(&self) -> i32 {
        self.term_buffer_length
    }

    pub fn position_bits_to_shift(&self) -> u32 {
        self.position_bits_to_shift
    }

    /// Absolute stream position for a consumption point reported in term
    /// coordinates.
    pub fn position(&self, term_id: TermId, term_offset: i32) -> Position {
        compute_position(
            term_id,
            term_offset,
            self.position_bits_to_shift,
            self.initial_term_id,
        )
    }
}
