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

//! Student id and slot-window validation.
//!
//! Both checks are pure; the current time is always supplied by the caller.

use crate::catalog::{Catalog, StudentIdRange, TimeSlot};
use crate::error::StudentIdError;
use chrono::{NaiveTime, Timelike};

/// Validates a student id: exactly five digits after trimming, with a
/// numeric value inside `range`. Returns the numeric value.
pub fn validate_student_id(id: &str, range: &StudentIdRange) -> Result<u32, StudentIdError> {
    let id = id.trim();
    if id.len() != 5 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StudentIdError::InvalidFormat);
    }
    let value: u32 = id.parse().map_err(|_| StudentIdError::InvalidFormat)?;
    if !range.contains(value) {
        return Err(StudentIdError::OutOfRange);
    }
    Ok(value)
}

pub fn minute_of_day(now: NaiveTime) -> u16 {
    (now.hour() * 60 + now.minute()) as u16
}

/// True while `now` is at or before the slot's cutoff minute.
///
/// The cutoff minute itself is still bookable: with a 12:20 cutoff, 12:20:59
/// is allowed and 12:21:00 is not.
pub fn is_slot_booking_allowed(catalog: &Catalog, slot_id: &str, now: NaiveTime) -> bool {
    minute_of_day(now) <= catalog.cutoff(slot_id)
}

/// Slots that can still be booked at `now`, in catalog order.
pub fn bookable_slots(catalog: &Catalog, now: NaiveTime) -> Vec<&TimeSlot> {
    catalog
        .time_slots
        .iter()
        .filter(|slot| is_slot_booking_allowed(catalog, &slot.id, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn accepts_ids_in_range() {
        let range = StudentIdRange::default();
        assert_eq!(validate_student_id("10101", &range), Ok(10101));
        assert_eq!(validate_student_id("31027", &range), Ok(31027));
        assert_eq!(validate_student_id(" 20315 ", &range), Ok(20315));
    }

    #[test]
    fn rejects_bad_format() {
        let range = StudentIdRange::default();
        for id in ["1234", "123456", "abcde", "", "1 234", "+1234", "１２３４５"] {
            assert_eq!(
                validate_student_id(id, &range),
                Err(StudentIdError::InvalidFormat),
                "{id:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range() {
        let range = StudentIdRange::default();
        assert_eq!(validate_student_id("09999", &range), Err(StudentIdError::OutOfRange));
        assert_eq!(validate_student_id("10100", &range), Err(StudentIdError::OutOfRange));
        assert_eq!(validate_student_id("31028", &range), Err(StudentIdError::OutOfRange));
    }

    #[test]
    fn lunch_cutoff_is_inclusive() {
        let catalog = Catalog::default();
        assert!(is_slot_booking_allowed(&catalog, "lunch", at(12, 19)));
        assert!(is_slot_booking_allowed(&catalog, "lunch", at(12, 20)));
        assert!(is_slot_booking_allowed(
            &catalog,
            "lunch",
            NaiveTime::from_hms_opt(12, 20, 59).unwrap()
        ));
        assert!(!is_slot_booking_allowed(&catalog, "lunch", at(12, 21)));
    }

    #[test]
    fn slot_without_cutoff_is_always_open() {
        let catalog = Catalog::default();
        assert!(is_slot_booking_allowed(&catalog, "unknown", at(23, 59)));
    }

    #[test]
    fn bookable_slots_shrink_through_the_day() {
        fn ids(catalog: &Catalog, now: NaiveTime) -> Vec<&str> {
            bookable_slots(catalog, now)
                .into_iter()
                .map(|s| s.id.as_str())
                .collect()
        }

        let catalog = Catalog::default();
        assert_eq!(ids(&catalog, at(8, 0)).len(), 5);
        assert_eq!(
            ids(&catalog, at(12, 21)),
            vec!["period8", "dinner", "study1", "study2"]
        );
        assert_eq!(ids(&catalog, at(18, 0)), vec!["study1", "study2"]);
        assert!(ids(&catalog, at(20, 1)).is_empty());
    }
}
