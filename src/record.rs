//! Decoding of a single USN change journal record.
//!
//! Layout reference:
//! https://learn.microsoft.com/en-us/windows/win32/api/winioctl/ns-winioctl-usn_record_v2

use byteorder::LittleEndian;
use log::{debug, trace, warn};

use crate::{
    Usn, UsnResult,
    cursor::ByteCursor,
    errors::UsnError,
    flags::{FileAttributeFlags, ReasonFlags, SourceFlags},
    time::{FileTime, Timestamp},
    utf16::{self, DecodedString},
};

/// Size of the fixed record header shared by versions 2 and 3; also the
/// smallest valid record.
pub const USN_RECORD_HEADER_SIZE: usize = 60;

const TIMESTAMP_FIELD: usize = 32;
const FILE_NAME_LENGTH_FIELD: usize = 56;

/// A 64-bit NTFS file reference: a 48-bit MFT entry index and a 16-bit
/// sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileReference(pub u64);

impl FileReference {
    /// MFT entry index (low 48 bits).
    pub fn mft_entry(&self) -> u64 {
        self.0 & 0x0000_FFFF_FFFF_FFFF
    }

    /// Sequence number (bits 48..64).
    pub fn sequence_number(&self) -> u16 {
        (self.0 >> 48) as u16
    }
}

impl From<u64> for FileReference {
    fn from(value: u64) -> Self {
        FileReference(value)
    }
}

/// Returns true for the record versions this decoder knows the layout of.
pub fn is_known_version(major_version: u16) -> bool {
    matches!(major_version, 2 | 3)
}

/// A decoded USN change journal record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsnRecord {
    pub record_length: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub file_reference: FileReference,
    pub parent_file_reference: FileReference,
    pub usn: Usn,
    pub filetime: FileTime,
    pub timestamp: Timestamp,
    pub reason: ReasonFlags,
    pub source: SourceFlags,
    pub security_id: u32,
    pub file_attributes: FileAttributeFlags,
    pub file_name_length: u16,
    pub file_name_offset: u16,
    pub file_name: DecodedString,
    /// Set when the major version is neither 2 nor 3. The fixed header is
    /// still decoded with the shared layout.
    pub unsupported_version: bool,
}

/// Raw header values, before validation.
struct RecordHeader {
    record_length: u32,
    major_version: u16,
    minor_version: u16,
    file_reference: FileReference,
    parent_file_reference: FileReference,
    usn: Usn,
    filetime: FileTime,
    reason: u32,
    source: u32,
    security_id: u32,
    file_attributes: u32,
    file_name_length: u16,
    file_name_offset: u16,
}

impl RecordHeader {
    fn read(cursor: &mut ByteCursor<'_>) -> UsnResult<Self> {
        Ok(RecordHeader {
            record_length: cursor.read_u32::<LittleEndian>()?,
            major_version: cursor.read_u16::<LittleEndian>()?,
            minor_version: cursor.read_u16::<LittleEndian>()?,
            file_reference: FileReference(cursor.read_u64::<LittleEndian>()?),
            parent_file_reference: FileReference(cursor.read_u64::<LittleEndian>()?),
            usn: cursor.read_i64::<LittleEndian>()?,
            filetime: FileTime(cursor.read_u64::<LittleEndian>()?),
            reason: cursor.read_u32::<LittleEndian>()?,
            source: cursor.read_u32::<LittleEndian>()?,
            security_id: cursor.read_u32::<LittleEndian>()?,
            file_attributes: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            file_name_offset: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

fn truncated(declared: usize, available: usize) -> UsnError {
    UsnError::TruncatedRecord {
        offset: 0,
        declared,
        available,
    }
}

impl UsnRecord {
    /// Decodes the record that starts at offset 0 of `buf`.
    ///
    /// `buf` may extend past the record; only `record_length` bytes are used.
    ///
    /// # Arguments
    /// * `buf` - Bytes believed to hold a USN record at offset 0.
    ///
    /// # Returns
    /// * `Ok(UsnRecord)` - The decoded record.
    /// * `Err(UsnError::TruncatedRecord)` - `buf` is shorter than the fixed header, or the
    ///   declared record length is below the header size or past the end of `buf`.
    /// * `Err(UsnError::InvalidFieldOffset)` - The file name runs past the declared record length.
    /// * `Err(UsnError::InvalidStringLength)` - The file name length is odd.
    pub fn parse(buf: &[u8]) -> UsnResult<Self> {
        if buf.len() < USN_RECORD_HEADER_SIZE {
            return Err(truncated(USN_RECORD_HEADER_SIZE, buf.len()));
        }

        let mut cursor = ByteCursor::new(buf);
        let header = RecordHeader::read(&mut cursor)?;
        trace!(
            "USN record header: length={}, version={}.{}, name_offset={}, name_length={}",
            header.record_length,
            header.major_version,
            header.minor_version,
            header.file_name_offset,
            header.file_name_length
        );

        let record_length = header.record_length as usize;
        if record_length < USN_RECORD_HEADER_SIZE || record_length > buf.len() {
            return Err(truncated(record_length, buf.len()));
        }

        let name_offset = usize::from(header.file_name_offset);
        let name_length = usize::from(header.file_name_length);
        if name_offset + name_length > record_length {
            return Err(UsnError::InvalidFieldOffset {
                offset: FILE_NAME_LENGTH_FIELD,
                field_offset: name_offset,
                field_length: name_length,
                record_length,
            });
        }

        let record_bytes = buf
            .get(..record_length)
            .ok_or_else(|| truncated(record_length, buf.len()))?;

        let timestamp = header
            .filetime
            .to_timestamp()
            .map_err(|err| err.rebase(TIMESTAMP_FIELD))?;
        let file_name = utf16::decode_utf16le_at(record_bytes, name_offset, name_length)?;

        let unsupported_version = !is_known_version(header.major_version);
        if unsupported_version {
            warn!(
                "USN record version {}.{} is not supported; decoded with the version 2/3 header layout",
                header.major_version, header.minor_version
            );
        }
        if file_name.is_lossy() {
            warn!(
                "USN record {}: {} unpaired surrogate(s) replaced in file name",
                header.usn,
                file_name.substitutions()
            );
        }

        let record = UsnRecord {
            record_length: header.record_length,
            major_version: header.major_version,
            minor_version: header.minor_version,
            file_reference: header.file_reference,
            parent_file_reference: header.parent_file_reference,
            usn: header.usn,
            filetime: header.filetime,
            timestamp,
            reason: ReasonFlags::from_bits(header.reason),
            source: SourceFlags::from_bits(header.source),
            security_id: header.security_id,
            file_attributes: FileAttributeFlags::from_bits(header.file_attributes),
            file_name_length: header.file_name_length,
            file_name_offset: header.file_name_offset,
            file_name,
            unsupported_version,
        };

        debug!(
            "Decoded USN record: usn={}, version={}.{}, length={}",
            record.usn, record.major_version, record.minor_version, record.record_length
        );

        Ok(record)
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// File reference of the changed file.
    pub fn file_reference(&self) -> FileReference {
        self.file_reference
    }

    /// File reference of the directory holding the changed file.
    pub fn parent_file_reference(&self) -> FileReference {
        self.parent_file_reference
    }

    /// Returns true if this entry represents a directory.
    pub fn is_dir(&self) -> bool {
        self.file_attributes.contains_bit(FileAttributeFlags::DIRECTORY)
    }

    /// Returns true if this entry represents a hidden file or directory.
    pub fn is_hidden(&self) -> bool {
        self.file_attributes.contains_bit(FileAttributeFlags::HIDDEN)
    }

    /// Converts the reason bitfield to a human-readable string.
    pub fn reason_to_string(&self) -> String {
        crate::format::format_flags(&self.reason, &crate::format::FormatOptions::default())
    }
}

/// Decodes the record that starts at offset 0 of `buf`.
///
/// # Arguments
/// * `buf` - Bytes believed to hold a USN record at offset 0.
///
/// # Returns
/// The same result as [`UsnRecord::parse`].
pub fn decode_record(buf: &[u8]) -> UsnResult<UsnRecord> {
    UsnRecord::parse(buf)
}
