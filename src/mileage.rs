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

//! Mileage ranking and presence derivation for the teacher dashboard.
//!
//! Mileage is one point per reservation plus one point per check-in event.
//! Checkout records are not counted and do not create or rename entries.
//!
//! A student's displayed name is whichever name was seen last while folding:
//! all reservations in input order, then all check-ins in input order. The
//! store has no authoritative name field, so this is the documented policy.
//!
//! # Example
//!
//! ```
//! use studyroom_reservation::mileage::aggregate;
//!
//! let ranking = aggregate(&[], &[]);
//! assert!(ranking.is_empty());
//! ```

use crate::attendance::AttendanceRecord;
use crate::reservation::Reservation;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub student_id: String,
    pub name: String,
    pub total_mileage: u32,
    pub reservation_count: u32,
    pub attendance_count: u32,
}

#[derive(Debug)]
struct Tally {
    student_id: String,
    name: String,
    reservation_count: u32,
    attendance_count: u32,
}

fn tally<'a, 't>(
    index: &mut HashMap<&'a str, usize>,
    tallies: &'t mut Vec<Tally>,
    student_id: &'a str,
    name: &str,
) -> &'t mut Tally {
    let slot = *index.entry(student_id).or_insert_with(|| {
        tallies.push(Tally {
            student_id: student_id.to_string(),
            name: String::new(),
            reservation_count: 0,
            attendance_count: 0,
        });
        tallies.len() - 1
    });
    let entry = &mut tallies[slot];
    entry.name = name.to_string();
    entry
}

/// Folds both snapshots into a ranking, highest mileage first.
///
/// Ties keep first-encounter order of the student id. The result depends
/// only on the inputs, so repeated calls give identical rankings.
pub fn aggregate(
    reservations: &[Reservation],
    attendance: &[AttendanceRecord],
) -> Vec<MileageEntry> {
    let mut index = HashMap::new();
    let mut tallies = Vec::new();

    for reservation in reservations {
        tally(&mut index, &mut tallies, &reservation.student_id, &reservation.name)
            .reservation_count += 1;
    }
    for record in attendance.iter().filter(|r| r.is_checkin()) {
        tally(&mut index, &mut tallies, &record.student_id, &record.name).attendance_count += 1;
    }

    let mut entries: Vec<MileageEntry> = tallies
        .into_iter()
        .map(|t| MileageEntry {
            rank: 0,
            total_mileage: t.reservation_count + t.attendance_count,
            student_id: t.student_id,
            name: t.name,
            reservation_count: t.reservation_count,
            attendance_count: t.attendance_count,
        })
        .collect();

    // stable: equal totals stay in first-encounter order
    entries.sort_by(|a, b| b.total_mileage.cmp(&a.total_mileage));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

/// Latest attendance record of every student whose latest record is a
/// check-in, in first-seen order.
///
/// "Latest" is by timestamp; records with equal timestamps resolve to the
/// one later in the log.
pub fn currently_present(attendance: &[AttendanceRecord]) -> Vec<&AttendanceRecord> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&AttendanceRecord> = Vec::new();

    for record in attendance {
        match index.get(record.student_id.as_str()) {
            Some(&slot) => {
                if record.timestamp >= latest[slot].timestamp {
                    latest[slot] = record;
                }
            }
            None => {
                index.insert(&record.student_id, latest.len());
                latest.push(record);
            }
        }
    }

    latest.into_iter().filter(|r| r.is_checkin()).collect()
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today_reservations: usize,
    pub total_attendance: usize,
    pub currently_studying: usize,
}

impl DashboardSummary {
    pub fn new(
        reservations: &[Reservation],
        attendance: &[AttendanceRecord],
        today: NaiveDate,
    ) -> Self {
        Self {
            today_reservations: reservations.iter().filter(|r| r.date == today).count(),
            total_attendance: attendance.len(),
            currently_studying: currently_present(attendance).len(),
        }
    }
}
