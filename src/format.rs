//! Diagnostic text for decoded values.
//!
//! Formatting never fails and never feeds back into decoding; the options here
//! only change how an already decoded value is rendered.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use crate::{
    flags::{FileAttributeFlags, FlagSet, ReasonFlags, SourceFlags},
    record::UsnRecord,
    time::Timestamp,
    utf16::DecodedString,
};

/// How a calendar instant is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeFormat {
    /// `2009-01-01T00:00:00.0000000Z`
    #[default]
    Iso8601,
    /// `Jan 01, 2009 00:00:00.0000000 UTC`
    Ctime,
}

/// Fractional-second digits in a rendered timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePrecision {
    Seconds,
    Milliseconds,
    Microseconds,
    /// Full FILETIME resolution, seven digits.
    #[default]
    Ticks,
}

impl TimePrecision {
    fn digits(&self) -> usize {
        match self {
            TimePrecision::Seconds => 0,
            TimePrecision::Milliseconds => 3,
            TimePrecision::Microseconds => 6,
            TimePrecision::Ticks => 7,
        }
    }
}

#[derive(Debug, Clone)]
/// Options for rendering decoded values.
pub struct FormatOptions {
    pub date_time: DateTimeFormat,
    pub precision: TimePrecision,
    pub flag_separator: &'static str,
    pub show_unknown_bits: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            date_time: DateTimeFormat::Iso8601,
            precision: TimePrecision::Ticks,
            flag_separator: " | ",
            show_unknown_bits: true,
        }
    }
}

/// Joins the names of the set flags, followed by any unknown residual bits.
///
/// # Arguments
/// * `flags` - A decoded flag word.
/// * `options` - Separator and whether residual bits are shown.
///
/// # Returns
/// The flag names in table order, or `"NONE"` when nothing would be printed.
pub fn format_flags(flags: &FlagSet, options: &FormatOptions) -> String {
    let mut parts: Vec<String> = flags.names().map(str::to_string).collect();
    if options.show_unknown_bits && flags.unknown_bits() != 0 {
        parts.push(format!("UNKNOWN(0x{:08x})", flags.unknown_bits()));
    }
    if parts.is_empty() {
        return "NONE".to_string();
    }
    parts.join(options.flag_separator)
}

fn fraction(datetime: &DateTime<Utc>, precision: TimePrecision) -> String {
    let digits = precision.digits();
    if digits == 0 {
        return String::new();
    }
    // chrono keeps nanoseconds; FILETIME resolution is 100ns.
    let nanos = datetime.timestamp_subsec_nanos();
    let scaled = nanos / 10u32.pow(9 - digits as u32);
    format!(".{:0width$}", scaled, width = digits)
}

/// Renders a timestamp as a calendar instant in UTC.
///
/// # Arguments
/// * `timestamp` - A decoded timestamp.
/// * `options` - Date style and fractional-second precision.
///
/// # Returns
/// The formatted instant, or `"Not set (0)"` for [`Timestamp::NotSet`].
pub fn format_timestamp(timestamp: &Timestamp, options: &FormatOptions) -> String {
    let datetime = match timestamp {
        Timestamp::NotSet => return "Not set (0)".to_string(),
        Timestamp::At(datetime) => datetime,
    };
    let fraction = fraction(datetime, options.precision);
    match options.date_time {
        DateTimeFormat::Iso8601 => {
            format!("{}{}Z", datetime.format("%Y-%m-%dT%H:%M:%S"), fraction)
        }
        DateTimeFormat::Ctime => {
            format!("{}{} UTC", datetime.format("%b %d, %Y %H:%M:%S"), fraction)
        }
    }
}

/// Renders a decoded file name.
///
/// # Arguments
/// * `value` - A decoded UTF-16 string.
///
/// # Returns
/// The text, with any unpaired surrogates already shown as U+FFFD.
pub fn format_string(value: &DecodedString) -> String {
    value.as_str().to_string()
}

/// Renders every field of a record, one per line.
///
/// # Arguments
/// * `record` - A decoded record.
/// * `options` - Passed through to the flag and timestamp formatters.
///
/// # Returns
/// A multi-line dump ending with a newline.
pub fn format_record(record: &UsnRecord, options: &FormatOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_record(&mut out, record, options);
    out
}

fn write_record(out: &mut String, record: &UsnRecord, options: &FormatOptions) -> fmt::Result {
    writeln!(out, "Record length\t\t\t: {}", record.record_length)?;
    write!(
        out,
        "Version\t\t\t\t: {}.{}",
        record.major_version, record.minor_version
    )?;
    if record.unsupported_version {
        out.push_str(" (unsupported)");
    }
    out.push('\n');
    writeln!(
        out,
        "File reference\t\t\t: {}-{}",
        record.file_reference.mft_entry(),
        record.file_reference.sequence_number()
    )?;
    writeln!(
        out,
        "Parent file reference\t\t: {}-{}",
        record.parent_file_reference.mft_entry(),
        record.parent_file_reference.sequence_number()
    )?;
    writeln!(out, "Update sequence number\t\t: {}", record.usn)?;
    writeln!(
        out,
        "Update time\t\t\t: {}",
        format_timestamp(&record.timestamp, options)
    )?;
    writeln!(
        out,
        "Update reason flags\t\t: 0x{:08x} ({})",
        record.reason.bits(),
        format_flags(&record.reason, options)
    )?;
    writeln!(
        out,
        "Update source flags\t\t: 0x{:08x} ({})",
        record.source.bits(),
        format_flags(&record.source, options)
    )?;
    writeln!(out, "Security descriptor identifier\t: {}", record.security_id)?;
    writeln!(
        out,
        "File attribute flags\t\t: 0x{:08x} ({})",
        record.file_attributes.bits(),
        format_flags(&record.file_attributes, options)
    )?;
    writeln!(out, "Name offset\t\t\t: {}", record.file_name_offset)?;
    writeln!(out, "Name size\t\t\t: {}", record.file_name_length)?;
    writeln!(out, "Name\t\t\t\t: {}", format_string(&record.file_name))
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_flags(self, &FormatOptions::default()))
    }
}

macro_rules! display_via_flag_set {
    ($($name:ty),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self.as_flag_set(), f)
                }
            }
        )+
    };
}

display_via_flag_set!(ReasonFlags, SourceFlags, FileAttributeFlags);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_timestamp(self, &FormatOptions::default()))
    }
}

impl fmt::Display for UsnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_record(self, &FormatOptions::default()))
    }
}
