use thiserror::Error;

/// Errors raised while decoding a USN record.
///
/// Every variant carries the byte offset, relative to the start of the record
/// buffer, at which decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsnError {
    #[error("Out of bounds at offset {offset}: needed {needed} bytes, {available} available")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// `declared` is the length the record needs: the fixed header size when
    /// the buffer cannot hold a header, otherwise the RecordLength field.
    #[error("Truncated record at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedRecord {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error(
        "Invalid field offset at offset {offset}: field at {field_offset} with length {field_length} exceeds record length {record_length}"
    )]
    InvalidFieldOffset {
        offset: usize,
        field_offset: usize,
        field_length: usize,
        record_length: usize,
    },

    #[error("Invalid UTF-16 string length at offset {offset}: {length} bytes is not even")]
    InvalidStringLength { offset: usize, length: usize },

    #[error("Timestamp overflow at offset {offset}: {ticks} ticks is out of range")]
    TimestampOverflow { offset: usize, ticks: u64 },
}

impl UsnError {
    /// Byte offset at which the error occurred.
    pub fn offset(&self) -> usize {
        match self {
            UsnError::OutOfBounds { offset, .. }
            | UsnError::TruncatedRecord { offset, .. }
            | UsnError::InvalidFieldOffset { offset, .. }
            | UsnError::InvalidStringLength { offset, .. }
            | UsnError::TimestampOverflow { offset, .. } => *offset,
        }
    }

    /// Shifts the reported offset by `base`.
    ///
    /// Decoders working on a sub-slice report offsets relative to that slice;
    /// the record decoder rebases them onto the record start.
    pub fn rebase(self, base: usize) -> Self {
        match self {
            UsnError::OutOfBounds {
                offset,
                needed,
                available,
            } => UsnError::OutOfBounds {
                offset: offset.saturating_add(base),
                needed,
                available,
            },
            UsnError::TruncatedRecord {
                offset,
                declared,
                available,
            } => UsnError::TruncatedRecord {
                offset: offset.saturating_add(base),
                declared,
                available,
            },
            UsnError::InvalidFieldOffset {
                offset,
                field_offset,
                field_length,
                record_length,
            } => UsnError::InvalidFieldOffset {
                offset: offset.saturating_add(base),
                field_offset,
                field_length,
                record_length,
            },
            UsnError::InvalidStringLength { offset, length } => UsnError::InvalidStringLength {
                offset: offset.saturating_add(base),
                length,
            },
            UsnError::TimestampOverflow { offset, ticks } => UsnError::TimestampOverflow {
                offset: offset.saturating_add(base),
                ticks,
            },
        }
    }
}
