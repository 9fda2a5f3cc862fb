// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Core identifier types for reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Unique token identifying a reservation in the store.
///
/// Generated ids have the form `RES-<unix millis>`. Ids read back from the
/// store are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ReservationId(pub String);

impl ReservationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(value: &str) -> Self {
        ReservationId(value.to_string())
    }
}

static RESERVATION_IDS: ReservationIdGenerator = ReservationIdGenerator::new();

/// Issues time-derived reservation ids that never repeat within a process.
///
/// The millisecond component is the later of the caller's clock and the last
/// issued value plus one, so two bookings in the same millisecond (or a clock
/// that steps backwards) still get distinct ids.
#[derive(Debug, Default)]
pub struct ReservationIdGenerator {
    last: AtomicI64,
}

impl ReservationIdGenerator {
    pub const PREFIX: &'static str = "RES-";

    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Generator shared by every booking engine in the process.
    pub fn global() -> &'static Self {
        &RESERVATION_IDS
    }

    /// Returns the next id for a booking made at `now`.
    pub fn next(&self, now: DateTime<Utc>) -> ReservationId {
        let wanted = now.timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let issued = wanted.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                issued,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return ReservationId(format!("{}{}", Self::PREFIX, issued)),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn id_uses_clock_millis() {
        let generator = ReservationIdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(generator.next(now).as_str(), "RES-1700000000123");
    }

    #[test]
    fn same_millisecond_yields_distinct_ids() {
        let generator = ReservationIdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = generator.next(now);
        let second = generator.next(now);
        assert_ne!(first, second);
        assert_eq!(second.as_str(), "RES-1700000000001");
    }

    #[test]
    fn clock_stepping_backwards_still_advances() {
        let generator = ReservationIdGenerator::new();
        let later = Utc.timestamp_millis_opt(2_000).unwrap();
        let earlier = Utc.timestamp_millis_opt(1_000).unwrap();
        generator.next(later);
        assert_eq!(generator.next(earlier).as_str(), "RES-2001");
    }

    #[test]
    fn ids_unique_across_threads() {
        let generator = std::sync::Arc::new(ReservationIdGenerator::new());
        let now = Utc.timestamp_millis_opt(5_000).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..250).map(|_| generator.next(now)).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate reservation id");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
