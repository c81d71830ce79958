//! # usn-record-rs
//!
//! A Rust library for decoding NTFS USN change journal records from raw bytes.
//!
//! Records are read from a caller-supplied buffer (a `$UsnJrnl:$J` extract, a
//! disk image, a memory dump) and decoded defensively: truncated records and
//! bad offsets are typed errors carrying the byte offset where decoding
//! stopped, while unknown flag bits and unpaired UTF-16 surrogates are kept or
//! substituted rather than rejected.
//!
//! ## Features
//! - Version 2 and version 3 records (shared 60-byte header)
//! - Reason, source and file attribute flags with unknown-bit preservation
//! - FILETIME conversion with an explicit "not set" state
//! - Diagnostic text rendering of records and their fields
//!
//! ## Example: Decode a record
//! ```rust
//! use usn_record_rs::{UsnRecord, format::FormatOptions};
//!
//! fn dump(bytes: &[u8]) {
//!     match UsnRecord::parse(bytes) {
//!         Ok(record) => println!("{}", usn_record_rs::format::format_record(&record, &FormatOptions::default())),
//!         Err(e) => eprintln!("Error decoding record at offset {}: {}", e.offset(), e),
//!     }
//! }
//! ```
//!
//! Locating records inside a journal stream and reading bytes from a volume
//! are left to the caller.
//!
//! ## License
//! MIT License.

pub mod cursor;
pub mod errors;
pub mod flags;
pub mod format;
pub mod record;
pub mod time;
pub mod utf16;

// Re-export commonly used types
pub use errors::UsnError;
pub use flags::{FileAttributeFlags, FlagSet, ReasonFlags, SourceFlags};
pub use record::{FileReference, UsnRecord, decode_record};
pub use time::{FileTime, Timestamp};
pub use utf16::DecodedString;

/// A convenient type alias for Results with UsnError.
pub type UsnResult<T> = std::result::Result<T, UsnError>;


pub type Usn = i64;

/// Smallest possible record: the fixed header shared by versions 2 and 3.
pub const MIN_RECORD_SIZE: usize = record::USN_RECORD_HEADER_SIZE;
