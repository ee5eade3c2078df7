//! Injected capabilities for values the store generates itself.
//!
//! Identifiers and timestamps are never produced inline; the store asks an
//! [`IdGenerator`] and a [`Clock`] so tests can pin both.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of business identifiers for new documents.
pub trait IdGenerator: Send + Sync {
    /// Return a fresh identifier. Collisions are treated as negligible.
    fn next_id(&self) -> String;
}

/// Source of write timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Random UUID v4 identifiers, hyphenated lowercase.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Wall clock in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_unique() {
        let gen = UuidGenerator;
        let a = gen.next_id();
        let b = gen.next_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_system_clock_monotone_enough() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
