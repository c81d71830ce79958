use byteorder::ByteOrder;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, Utc};
use std::time::SystemTime;

use crate::{UsnResult, errors::UsnError};

// Define the Windows epoch as a const.
// NaiveDate/Time construction can panic if given invalid values, but 1601-01-01 00:00:00 is valid.
const WINDOWS_EPOCH_NAIVE: NaiveDateTime = match NaiveDate::from_ymd_opt(1601, 1, 1) {
    Some(date) => match date.and_hms_opt(0, 0, 0) {
        Some(datetime) => datetime,
        None => panic!("Invalid time component for Windows epoch constant"),
    },
    None => panic!("Invalid date component for Windows epoch constant"),
};
const WINDOWS_EPOCH_UTC: DateTime<Utc> =
    DateTime::<Utc>::from_naive_utc_and_offset(WINDOWS_EPOCH_NAIVE, Utc);

/// 100-nanosecond intervals per second.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// A Windows FILETIME: 100-nanosecond intervals since 1601-01-01 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileTime(pub u64);

/// A decoded FILETIME.
///
/// A raw value of zero means the timestamp was never written; it is kept
/// apart from the 1601 epoch instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    NotSet,
    At(DateTime<Utc>),
}

impl FileTime {
    /// Reads a FILETIME from the first 8 bytes of `bytes` using byte order `E`.
    pub fn from_bytes<E: ByteOrder>(bytes: &[u8]) -> UsnResult<Self> {
        match bytes.get(..8) {
            Some(raw) => Ok(FileTime(E::read_u64(raw))),
            None => Err(UsnError::OutOfBounds {
                offset: 0,
                needed: 8,
                available: bytes.len(),
            }),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0 != 0
    }

    /// Converts to a calendar instant.
    ///
    /// Uses integer arithmetic only. Fails with `TimestampOverflow` (at offset 0,
    /// rebased by the caller) when the instant cannot be represented.
    pub fn to_timestamp(&self) -> UsnResult<Timestamp> {
        if self.0 == 0 {
            return Ok(Timestamp::NotSet);
        }

        let overflow = || UsnError::TimestampOverflow {
            offset: 0,
            ticks: self.0,
        };

        // Convert 100-nanosecond intervals to seconds and remaining nanoseconds.
        let secs_since_windows_epoch = self.0 / TICKS_PER_SECOND;
        let nanos_remainder = (self.0 % TICKS_PER_SECOND) * 100;

        let secs = i64::try_from(secs_since_windows_epoch).map_err(|_| overflow())?;
        let duration_since_windows_epoch = ChronoDuration::try_seconds(secs)
            .ok_or_else(overflow)?
            .checked_add(&ChronoDuration::nanoseconds(nanos_remainder as i64))
            .ok_or_else(overflow)?;

        WINDOWS_EPOCH_UTC
            .checked_add_signed(duration_since_windows_epoch)
            .map(Timestamp::At)
            .ok_or_else(overflow)
    }

    /// Converts to a `std::time::SystemTime`.
    ///
    /// Returns `None` for an unset value or one the platform cannot represent.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        match self.to_timestamp() {
            Ok(Timestamp::At(datetime)) => {
                let since_unix = datetime.signed_duration_since(DateTime::<Utc>::UNIX_EPOCH);
                match since_unix.to_std() {
                    Ok(after) => SystemTime::UNIX_EPOCH.checked_add(after),
                    Err(_) => (-since_unix)
                        .to_std()
                        .ok()
                        .and_then(|before| SystemTime::UNIX_EPOCH.checked_sub(before)),
                }
            }
            _ => None,
        }
    }
}

impl From<u64> for FileTime {
    fn from(ticks: u64) -> Self {
        FileTime(ticks)
    }
}

impl Timestamp {
    pub fn is_set(&self) -> bool {
        matches!(self, Timestamp::At(_))
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::NotSet => None,
            Timestamp::At(datetime) => Some(*datetime),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};
    use chrono::Timelike;
    use std::time::{Duration, UNIX_EPOCH};

    const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        DateTime::<Utc>::from_naive_utc_and_offset(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
            Utc,
        )
    }

    #[test]
    fn zero_is_not_set() -> UsnResult<()> {
        assert_eq!(FileTime(0).to_timestamp()?, Timestamp::NotSet);
        assert!(!FileTime(0).is_set());
        assert_eq!(FileTime(0).to_system_time(), None);
        Ok(())
    }

    #[test]
    fn first_tick_is_a_real_instant() -> UsnResult<()> {
        let ts = FileTime(1).to_timestamp()?;
        let datetime = ts.datetime().unwrap();
        assert_eq!(datetime.date_naive(), NaiveDate::from_ymd_opt(1601, 1, 1).unwrap());
        assert_eq!(datetime.nanosecond(), 100);
        Ok(())
    }

    #[test]
    fn unix_epoch_vector() -> UsnResult<()> {
        let ts = FileTime(UNIX_EPOCH_TICKS).to_timestamp()?;
        assert_eq!(ts, Timestamp::At(DateTime::<Utc>::UNIX_EPOCH));
        assert_eq!(FileTime(UNIX_EPOCH_TICKS).to_system_time(), Some(UNIX_EPOCH));
        Ok(())
    }

    #[test]
    fn new_year_2009_vector() -> UsnResult<()> {
        let ts = FileTime(128_752_416_000_000_000).to_timestamp()?;
        assert_eq!(ts, Timestamp::At(utc(2009, 1, 1, 0, 0, 0)));
        Ok(())
    }

    #[test]
    fn sub_second_ticks_survive() -> UsnResult<()> {
        // 2023-07-15 12:30:45 plus 1234567 ticks.
        let base = UNIX_EPOCH_TICKS + 1_689_424_245 * TICKS_PER_SECOND;
        let ts = FileTime(base + 1_234_567).to_timestamp()?;
        let datetime = ts.datetime().unwrap();
        assert_eq!(datetime.with_nanosecond(0).unwrap(), utc(2023, 7, 15, 12, 30, 45));
        assert_eq!(datetime.nanosecond(), 123_456_700);
        Ok(())
    }

    #[test]
    fn max_ticks_converts_without_wrapping() -> UsnResult<()> {
        // u64::MAX ticks is roughly the year 60056, inside chrono's range.
        let ts = FileTime(u64::MAX).to_timestamp()?;
        assert!(ts.datetime().unwrap() > utc(9999, 12, 31, 23, 59, 59));
        Ok(())
    }

    #[test]
    fn pre_unix_system_time() {
        let system_time = FileTime(1).to_system_time().unwrap();
        let secs_between_epochs = UNIX_EPOCH_TICKS / TICKS_PER_SECOND;
        let expected =
            UNIX_EPOCH - Duration::from_secs(secs_between_epochs) + Duration::from_nanos(100);
        assert_eq!(system_time, expected);
    }

    #[test]
    fn from_bytes_respects_byte_order() -> UsnResult<()> {
        let le = 128_752_416_000_000_000u64.to_le_bytes();
        let be = 128_752_416_000_000_000u64.to_be_bytes();
        assert_eq!(
            FileTime::from_bytes::<LittleEndian>(&le)?,
            FileTime::from_bytes::<BigEndian>(&be)?
        );
        assert!(matches!(
            FileTime::from_bytes::<LittleEndian>(&le[..7]),
            Err(UsnError::OutOfBounds { needed: 8, .. })
        ));
        Ok(())
    }
}
