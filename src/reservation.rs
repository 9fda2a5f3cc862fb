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

//! Reservation records as held in a snapshot and exchanged with the store.
//!
//! A reservation is created once by an accepted booking and removed from the
//! active set by a successful cancellation; it is never mutated in between.

use crate::base::ReservationId;
use crate::store::TEAM_ROOM_SEAT;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A teammate listed on a team-room booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub student_id: String,
    pub name: String,
}

impl TeamMember {
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
        }
    }

    /// Both fields non-blank after trimming.
    pub fn is_valid(&self) -> bool {
        !self.student_id.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Keeps only valid members, trimmed, in input order.
    pub fn filter_valid(members: &[TeamMember]) -> Vec<TeamMember> {
        members
            .iter()
            .filter(|m| m.is_valid())
            .map(|m| TeamMember::new(m.student_id.trim(), m.name.trim()))
            .collect()
    }

    /// Parses a sheet roster like `Kim(10101), Lee(10102)`.
    ///
    /// Entries without a parenthesised id are skipped.
    pub fn parse_roster(roster: &str) -> Vec<TeamMember> {
        roster
            .split(',')
            .filter_map(|entry| {
                let entry = entry.trim();
                let open = entry.rfind('(')?;
                let id = entry[open + 1..].strip_suffix(')')?;
                let member = TeamMember::new(id.trim(), entry[..open].trim());
                member.is_valid().then_some(member)
            })
            .collect()
    }
}

/// An active booking for one (date, location, seat, slot).
///
/// `time_slot` carries the slot *label* (e.g. `점심`), not the slot id; seat
/// uniqueness is checked against the label. `seat` is empty for team rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawReservation")]
pub struct Reservation {
    pub date: NaiveDate,
    pub student_id: String,
    pub name: String,
    pub location: String,
    pub seat: String,
    pub time_slot: String,
    pub reservation_id: ReservationId,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub team_members: Vec<TeamMember>,
}

impl Reservation {
    /// Roster in the sheet's `name(studentId), ...` format.
    pub fn team_members_string(&self) -> String {
        self.team_members
            .iter()
            .map(|m| format!("{}({})", m.name, m.student_id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_for(&self, location: &str, seat: &str, time_slot_label: &str) -> bool {
        self.location == location && self.seat == seat && self.time_slot == time_slot_label
    }
}

/// Wire shape of a reservation row as returned by the store script.
///
/// The sheet is loosely typed: dates may come back as full timestamps and
/// the roster may only be present as a display string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReservation {
    #[serde(deserialize_with = "lenient_date")]
    date: NaiveDate,
    #[serde(deserialize_with = "stringly")]
    student_id: String,
    #[serde(deserialize_with = "stringly")]
    name: String,
    location: String,
    #[serde(default, deserialize_with = "stringly")]
    seat: String,
    time_slot: String,
    reservation_id: ReservationId,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    team_members: Vec<TeamMember>,
    #[serde(default)]
    team_members_string: Option<String>,
}

impl From<RawReservation> for Reservation {
    fn from(raw: RawReservation) -> Self {
        let team_members = match (raw.team_members.is_empty(), raw.team_members_string) {
            (true, Some(roster)) => TeamMember::parse_roster(&roster),
            (_, _) => raw.team_members,
        };
        Reservation {
            date: raw.date,
            student_id: raw.student_id,
            name: raw.name,
            location: raw.location,
            // team rooms are stored with a marker instead of a seat number
            seat: if raw.seat == TEAM_ROOM_SEAT {
                String::new()
            } else {
                raw.seat
            },
            time_slot: raw.time_slot,
            reservation_id: raw.reservation_id,
            created_at: raw.timestamp,
            team_members,
        }
    }
}

/// Parses a store timestamp, RFC 3339 first, then a naive UTC form.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Unparseable timestamps sort as the epoch rather than failing the snapshot.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_timestamp(&raw).unwrap_or_else(|| {
        log::debug!("unparseable store timestamp {raw:?}, treating as epoch");
        DateTime::<Utc>::UNIX_EPOCH
    }))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Sheets hand numeric cells back as JSON numbers.
pub(crate) fn stringly<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(text)) => text,
        Some(Cell::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
