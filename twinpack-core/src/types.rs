use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::OffsetDateTime;

use crate::{Error, Result};

/// Explicit "no value", written as the format's null.
///
/// Distinct from `Option::None`: generic code can serialize the concept of
/// absence without picking a type for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nil;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// An instant as seconds since the Unix epoch plus a sub-second part.
///
/// `nanos` is always below one billion and counts forward from `seconds`,
/// so one nanosecond before the epoch is `{ seconds: -1, nanos: 999_999_999 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// 1970-01-01T00:00:00Z
    pub const UNIX_EPOCH: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    /// `None` if `nanos` is not below one billion.
    pub const fn new(seconds: i64, nanos: u32) -> Option<Self> {
        if nanos < NANOS_PER_SEC {
            Some(Self { seconds, nanos })
        } else {
            None
        }
    }

    /// Whole seconds since the epoch, rounded toward negative infinity.
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Nanoseconds past [`Timestamp::seconds`].
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Nanoseconds since the epoch.
    pub const fn unix_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SEC as i128 + self.nanos as i128
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp {
                seconds: i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                nanos: after.subsec_nanos(),
            },
            Err(err) => {
                // i128 so that exactly 2^63 seconds before the epoch fits
                let total = -(err.duration().as_nanos() as i128);
                let nanos = total.rem_euclid(NANOS_PER_SEC as i128) as u32;
                let seconds = i64::try_from(total.div_euclid(NANOS_PER_SEC as i128)).unwrap_or(i64::MIN);
                Timestamp { seconds, nanos }
            }
        }
    }
}

impl TryFrom<Timestamp> for SystemTime {
    type Error = Error;

    fn try_from(ts: Timestamp) -> Result<Self> {
        let whole = if ts.seconds >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(ts.seconds as u64))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(ts.seconds.unsigned_abs()))
        };
        whole
            .and_then(|t| t.checked_add(Duration::from_nanos(ts.nanos as u64)))
            .ok_or_else(|| Error::invalid_value(format!("{ts:?} is not representable as SystemTime")))
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(time: OffsetDateTime) -> Self {
        Timestamp {
            seconds: time.unix_timestamp(),
            nanos: time.nanosecond(),
        }
    }
}

impl TryFrom<Timestamp> for OffsetDateTime {
    type Error = Error;

    fn try_from(ts: Timestamp) -> Result<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(ts.unix_nanos())
            .map_err(|err| Error::invalid_value(err.to_string()))
    }
}

/// An application-defined binary extension value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    /// Application type code; negative codes are reserved for predefined types
    pub type_code: i8,
    /// Opaque payload
    pub data: Vec<u8>,
}

/// The header in front of an extension payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionHeader {
    /// Extension type code
    pub type_code: i8,
    /// Payload length in bytes
    pub length: u32,
}

/// A key and a value, serialized as a two-member record named `Key`/`Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyValuePair<K, V> {
    /// The key
    pub key: K,
    /// The value
    pub value: V,
}

impl<K, V> KeyValuePair<K, V> {
    /// Pair `key` with `value`.
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> From<(K, V)> for KeyValuePair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

/// A last-in, first-out stack.
///
/// Serialized top first, the order elements come off with [`Stack::pop`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stack<T> {
    /// Bottom to top.
    items: Vec<T>,
}

impl<T> Stack<T> {
    /// An empty stack.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// An empty stack with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Push onto the top.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove the top element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The top element.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> core::iter::Rev<core::slice::Iter<'_, T>> {
        self.items.iter().rev()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    /// Pushes in iteration order, so the last item ends on top.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use twinpack_testhelpers::test;

    #[test]
    fn system_time_before_epoch_borrows_a_second() {
        let time = UNIX_EPOCH - Duration::from_nanos(1);
        let ts = Timestamp::from(time);
        assert_eq!(ts, Timestamp::new(-1, 999_999_999).unwrap());
        assert_eq!(SystemTime::try_from(ts).unwrap(), time);

        let time = UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(Timestamp::from(time), Timestamp::new(-5, 0).unwrap());
    }

    #[test]
    fn system_time_at_the_earliest_second_converts_back() {
        let earliest = Timestamp::new(i64::MIN, 0).unwrap();
        // not every platform can hold it
        if let Ok(time) = SystemTime::try_from(earliest) {
            assert_eq!(Timestamp::from(time), earliest);
        }
        let just_after = Timestamp::new(i64::MIN, 1).unwrap();
        if let Ok(time) = SystemTime::try_from(just_after) {
            assert_eq!(Timestamp::from(time), just_after);
        }
    }

    #[test]
    fn offset_date_time_conversions() {
        let dt = datetime!(1969-12-31 23:59:59.5 UTC);
        let ts = Timestamp::from(dt);
        assert_eq!((ts.seconds(), ts.nanos()), (-1, 500_000_000));
        assert_eq!(OffsetDateTime::try_from(ts).unwrap(), dt);

        let out_of_range = Timestamp::new(i64::MAX, 0).unwrap();
        assert!(OffsetDateTime::try_from(out_of_range).is_err());
    }

    #[test]
    fn new_rejects_overflowing_nanos() {
        assert!(Timestamp::new(0, 1_000_000_000).is_none());
        assert_eq!(Timestamp::new(0, 0), Some(Timestamp::UNIX_EPOCH));
    }

    #[test]
    fn stack_iterates_top_first() {
        let mut stack: Stack<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.len(), 2);
    }
}
