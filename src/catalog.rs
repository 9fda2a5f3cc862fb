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

//! Static catalog of locations, time slots and the student id range.
//!
//! The catalog is configuration, not runtime state: it is built once (from
//! defaults or the config file) and handed to every engine that needs it.
//!
//! # Example
//!
//! ```
//! use studyroom_reservation::Catalog;
//!
//! let catalog = Catalog::default();
//! assert!(catalog.is_team_room("스터디룸"));
//! assert_eq!(catalog.cutoff("lunch"), 12 * 60 + 20);
//! ```

use serde::{Deserialize, Serialize};

/// How a location is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// Numbered seats, one booking per seat and slot.
    SeatRoom,
    /// Booked as a whole by a team; no seat numbers.
    TeamRoom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub kind: LocationKind,
    /// Numbered seats; ignored for team rooms.
    #[serde(default)]
    pub seats: u32,
}

impl Location {
    pub fn seat_room(name: impl Into<String>, seats: u32) -> Self {
        Self {
            name: name.into(),
            kind: LocationKind::SeatRoom,
            seats,
        }
    }

    pub fn team_room(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LocationKind::TeamRoom,
            seats: 0,
        }
    }

    pub fn seat_count(&self) -> u32 {
        match self.kind {
            LocationKind::SeatRoom => self.seats,
            LocationKind::TeamRoom => 0,
        }
    }
}

/// A fixed daily window students can book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    /// Display range, e.g. `12:30-13:30`.
    pub time: String,
    /// Last minute of the day (hour * 60 + minute) at which the slot can
    /// still be booked. `None` keeps the slot open all day.
    #[serde(default)]
    pub cutoff: Option<u16>,
}

impl TimeSlot {
    pub fn new(id: &str, label: &str, time: &str, cutoff: Option<u16>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            time: time.to_string(),
            cutoff,
        }
    }
}

/// Inclusive numeric range for five-digit student ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdRange {
    pub min: u32,
    pub max: u32,
}

impl StudentIdRange {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for StudentIdRange {
    fn default() -> Self {
        Self {
            min: 10101,
            max: 31027,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub locations: Vec<Location>,
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub student_ids: StudentIdRange,
}

impl Catalog {
    pub const END_OF_DAY: u16 = 24 * 60 - 1;

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn time_slot(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == id)
    }

    /// Anything not configured as a team room takes seat numbers.
    pub fn is_team_room(&self, location: &str) -> bool {
        self.location(location)
            .is_some_and(|l| l.kind == LocationKind::TeamRoom)
    }

    /// Cutoff for `slot_id`; slots without one close at the end of the day.
    pub fn cutoff(&self, slot_id: &str) -> u16 {
        self.time_slot(slot_id)
            .and_then(|s| s.cutoff)
            .unwrap_or(Self::END_OF_DAY)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            locations: vec![
                Location::team_room("스터디룸"),
                Location::seat_room("영글터 집중학습실", 8),
                Location::seat_room("영글터 자율학습실", 25),
                Location::seat_room("채움터", 9),
            ],
            time_slots: vec![
                TimeSlot::new("lunch", "점심", "12:30-13:30", Some(12 * 60 + 20)),
                TimeSlot::new("period8", "8교시", "16:40-17:30", Some(16 * 60 + 30)),
                TimeSlot::new("dinner", "저녁", "17:30-18:30", Some(17 * 60 + 20)),
                TimeSlot::new("study1", "야자1부", "18:30-20:00", Some(18 * 60 + 20)),
                TimeSlot::new("study2", "야자2부", "20:10-21:30", Some(20 * 60)),
            ],
            student_ids: StudentIdRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_team_rooms_have_zero_seats() {
        let catalog = Catalog::default();
        for location in &catalog.locations {
            if location.kind == LocationKind::TeamRoom {
                assert_eq!(location.seat_count(), 0);
            } else {
                assert!(location.seat_count() > 0, "{} has no seats", location.name);
            }
        }
    }

    #[test]
    fn team_room_seats_field_is_ignored() {
        let mut room = Location::team_room("세미나실");
        room.seats = 12;
        assert_eq!(room.seat_count(), 0);
    }

    #[test]
    fn missing_cutoff_means_end_of_day() {
        let mut catalog = Catalog::default();
        catalog
            .time_slots
            .push(TimeSlot::new("morning", "아침", "07:30-08:30", None));
        assert_eq!(catalog.cutoff("morning"), Catalog::END_OF_DAY);
        assert_eq!(catalog.cutoff("nope"), Catalog::END_OF_DAY);
        assert_eq!(catalog.cutoff("lunch"), 740);
    }

    #[test]
    fn student_id_range_is_inclusive() {
        let range = StudentIdRange::default();
        assert!(range.contains(10101));
        assert!(range.contains(31027));
        assert!(!range.contains(10100));
        assert!(!range.contains(31028));
    }
}
