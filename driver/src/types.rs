/// Absolute stream position in bytes, monotonic for the life of a stream.
pub type Position = i64;
/// Identifier of one term of a stream's circular log buffer.
pub type TermId = i32;
/// Opaque identity a receiver reports in its status messages.
pub type ReceiverId = u64;
/// Identifier partitioning multicast receivers into subgroups.
pub type GroupTag = i64;
/// Caller-supplied clock reading in nanoseconds.
pub type TimeNs = i64;
