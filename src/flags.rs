//! Bitflag taxonomies carried by a USN record.
//!
//! Each taxonomy is a static table of `(bit index, name)` pairs. Decoding a
//! word never fails: named bits are reported by name and anything left over is
//! kept in [`FlagSet::unknown_bits`], so no information is lost for bits that
//! newer Windows releases may define.

use std::ops::Deref;

/// A named bit within a taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagName {
    pub bit: u8,
    pub name: &'static str,
}

impl FlagName {
    pub const fn mask(&self) -> u32 {
        1u32 << self.bit
    }
}

/// The result of decoding a 32-bit word against a flag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSet {
    raw: u32,
    name_bits: u32,
    table: &'static [FlagName],
}

/// Decodes `word` against `table`.
pub fn decode_flags(word: u32, table: &'static [FlagName]) -> FlagSet {
    let name_bits = table
        .iter()
        .map(FlagName::mask)
        .filter(|mask| word & mask != 0)
        .fold(0, |acc, mask| acc | mask);

    FlagSet {
        raw: word,
        name_bits,
        table,
    }
}

impl FlagSet {
    /// The word as read from disk.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Set bits that have a name in the table.
    pub fn name_bits(&self) -> u32 {
        self.name_bits
    }

    /// Set bits with no known name.
    pub fn unknown_bits(&self) -> u32 {
        self.raw & !self.name_bits
    }

    pub fn is_empty(&self) -> bool {
        self.raw == 0
    }

    /// Returns true if every bit of `mask` is set.
    pub fn contains_bit(&self, mask: u32) -> bool {
        self.raw & mask == mask
    }

    /// Returns true if the flag called `name` is set.
    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Names of the set flags, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + use<> {
        let (raw, table) = (self.raw, self.table);
        table
            .iter()
            .filter(move |flag| raw & flag.mask() != 0)
            .map(|flag| flag.name)
    }

    pub fn table(&self) -> &'static [FlagName] {
        self.table
    }
}

macro_rules! flag_taxonomy {
    (
        $(#[$meta:meta])*
        $name:ident, $table:ident {
            $($flag:ident = $bit:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(FlagSet);

        pub static $table: &[FlagName] = &[
            $(FlagName { bit: $bit, name: stringify!($flag) }),+
        ];

        impl $name {
            $(pub const $flag: u32 = 1u32 << $bit;)+

            pub fn from_bits(word: u32) -> Self {
                $name(decode_flags(word, $table))
            }

            pub fn bits(&self) -> u32 {
                self.0.raw()
            }

            pub fn as_flag_set(&self) -> &FlagSet {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = FlagSet;

            fn deref(&self) -> &FlagSet {
                &self.0
            }
        }

        impl From<u32> for $name {
            fn from(word: u32) -> Self {
                $name::from_bits(word)
            }
        }
    };
}

flag_taxonomy! {
    /// Why a file changed (`USN_REASON_*`).
    ReasonFlags, REASON_FLAGS {
        DATA_OVERWRITE = 0,
        DATA_EXTEND = 1,
        DATA_TRUNCATION = 2,
        NAMED_DATA_OVERWRITE = 4,
        NAMED_DATA_EXTEND = 5,
        NAMED_DATA_TRUNCATION = 6,
        FILE_CREATE = 8,
        FILE_DELETE = 9,
        EA_CHANGE = 10,
        SECURITY_CHANGE = 11,
        RENAME_OLD_NAME = 12,
        RENAME_NEW_NAME = 13,
        INDEXABLE_CHANGE = 14,
        BASIC_INFO_CHANGE = 15,
        HARD_LINK_CHANGE = 16,
        COMPRESSION_CHANGE = 17,
        ENCRYPTION_CHANGE = 18,
        OBJECT_ID_CHANGE = 19,
        REPARSE_POINT_CHANGE = 20,
        STREAM_CHANGE = 21,
        TRANSACTED_CHANGE = 22,
        INTEGRITY_CHANGE = 23,
        DESIRED_STORAGE_CLASS_CHANGE = 24,
        CLOSE = 31,
    }
}

flag_taxonomy! {
    /// Who caused the change (`USN_SOURCE_*`).
    SourceFlags, SOURCE_FLAGS {
        DATA_MANAGEMENT = 0,
        AUXILIARY_DATA = 1,
        REPLICATION_MANAGEMENT = 2,
        CLIENT_REPLICATION_MANAGEMENT = 3,
    }
}

flag_taxonomy! {
    /// Attributes of the file after the change (`FILE_ATTRIBUTE_*`).
    FileAttributeFlags, FILE_ATTRIBUTE_FLAGS {
        READ_ONLY = 0,
        HIDDEN = 1,
        SYSTEM = 2,
        DIRECTORY = 4,
        ARCHIVE = 5,
        DEVICE = 6,
        NORMAL = 7,
        TEMPORARY = 8,
        SPARSE_FILE = 9,
        REPARSE_POINT = 10,
        COMPRESSED = 11,
        OFFLINE = 12,
        NOT_CONTENT_INDEXED = 13,
        ENCRYPTED = 14,
        INTEGRITY_STREAM = 15,
        VIRTUAL = 16,
        NO_SCRUB_DATA = 17,
        EA = 18,
        PINNED = 19,
        UNPINNED = 20,
        RECALL_ON_DATA_ACCESS = 22,
    }
}
