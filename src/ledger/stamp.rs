//! Timestamp and id sources used to stamp players and transactions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

pub trait Stamp: Send {
    fn now(&mut self) -> DateTime<Utc>;
    fn next_id(&mut self) -> String;
}

/// Wall clock plus random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStamp;

impl Stamp for SystemStamp {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }

    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic source: ids `"{prefix}-1"`, `"{prefix}-2"`, ... and a clock
/// that advances one second per reading from a fixed epoch.
#[derive(Debug, Clone)]
pub struct SequentialStamp {
    prefix: String,
    next: u64,
    clock: DateTime<Utc>,
}

impl SequentialStamp {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            clock: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

impl Default for SequentialStamp {
    fn default() -> Self {
        Self::new("id")
    }
}

impl Stamp for SequentialStamp {
    fn now(&mut self) -> DateTime<Utc> {
        let current = self.clock;
        self.clock += Duration::seconds(1);
        current
    }

    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_stamp_is_deterministic() {
        let mut stamp = SequentialStamp::new("p");
        assert_eq!(stamp.next_id(), "p-1");
        assert_eq!(stamp.next_id(), "p-2");
        let a = stamp.now();
        let b = stamp.now();
        assert_eq!(b - a, Duration::seconds(1));
    }

    #[test]
    fn system_ids_are_unique() {
        let mut stamp = SystemStamp;
        assert_ne!(stamp.next_id(), stamp.next_id());
    }
}
