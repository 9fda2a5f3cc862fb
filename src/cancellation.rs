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

//! Cancellation matching.

use crate::base::ReservationId;
use crate::catalog::StudentIdRange;
use crate::error::ReservationError;
use crate::reservation::Reservation;
use crate::validator::validate_student_id;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    /// Narrows the match when present and non-blank.
    #[serde(default)]
    pub reservation_id: Option<ReservationId>,
    pub student_id: String,
    pub name: String,
}

pub struct CancellationEngine {
    student_ids: StudentIdRange,
}

impl CancellationEngine {
    pub fn new(student_ids: StudentIdRange) -> Self {
        Self { student_ids }
    }

    /// Finds the reservation `request` refers to.
    ///
    /// Student id and name must both match exactly (case-sensitive, after
    /// trimming the request). When several reservations match, the one with
    /// the latest `created_at` is chosen; equal timestamps go to the one
    /// later in `snapshot`.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::MissingRequiredField`] - student id or name blank.
    /// - [`ReservationError::InvalidStudentId`] - student id fails validation.
    /// - [`ReservationError::NotFound`] - nothing in `snapshot` matches.
    pub fn decide<'s>(
        &self,
        request: &CancellationRequest,
        snapshot: &'s [Reservation],
    ) -> Result<&'s Reservation, ReservationError> {
        let student_id = request.student_id.trim();
        let name = request.name.trim();
        if student_id.is_empty() || name.is_empty() {
            return Err(ReservationError::MissingRequiredField);
        }
        validate_student_id(student_id, &self.student_ids)?;

        let wanted_id = request
            .reservation_id
            .as_ref()
            .map(|id| id.as_str().trim())
            .filter(|id| !id.is_empty());

        let found = snapshot
            .iter()
            .filter(|r| r.student_id == student_id && r.name == name)
            .filter(|r| wanted_id.is_none_or(|id| r.reservation_id.as_str() == id))
            .max_by_key(|r| r.created_at)
            .ok_or(ReservationError::NotFound)?;

        debug!("cancellation for {} matched {}", student_id, found.reservation_id);
        Ok(found)
    }
}

/// Drops the reservation with `reservation_id` from the active set.
pub fn remove_reservation(
    snapshot: &mut Vec<Reservation>,
    reservation_id: &ReservationId,
) -> Option<Reservation> {
    let index = snapshot
        .iter()
        .position(|r| &r.reservation_id == reservation_id)?;
    Some(snapshot.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn reservation(id: &str, student_id: &str, name: &str, at: i64) -> Reservation {
        Reservation {
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            student_id: student_id.to_string(),
            name: name.to_string(),
            location: "채움터".to_string(),
            seat: "1".to_string(),
            time_slot: "점심".to_string(),
            reservation_id: ReservationId::from(id),
            created_at: Utc.timestamp_opt(at, 0).unwrap(),
            team_members: Vec::new(),
        }
    }

    fn request(id: Option<&str>, student_id: &str, name: &str) -> CancellationRequest {
        CancellationRequest {
            reservation_id: id.map(ReservationId::from),
            student_id: student_id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let engine = CancellationEngine::new(StudentIdRange::default());
        let snapshot = vec![reservation("RES-1", "10101", "Kim", 10)];
        assert_eq!(
            engine.decide(&request(None, "10101", "kim"), &snapshot),
            Err(ReservationError::NotFound)
        );
    }

    #[test]
    fn blank_reservation_id_is_ignored() {
        let engine = CancellationEngine::new(StudentIdRange::default());
        let snapshot = vec![reservation("RES-1", "10101", "Kim", 10)];
        let found = engine
            .decide(&request(Some("  "), "10101", "Kim"), &snapshot)
            .unwrap();
        assert_eq!(found.reservation_id.as_str(), "RES-1");
    }

    #[test]
    fn equal_timestamps_pick_later_entry() {
        let engine = CancellationEngine::new(StudentIdRange::default());
        let snapshot = vec![
            reservation("RES-1", "10101", "Kim", 10),
            reservation("RES-2", "10101", "Kim", 10),
        ];
        let found = engine.decide(&request(None, "10101", "Kim"), &snapshot).unwrap();
        assert_eq!(found.reservation_id.as_str(), "RES-2");
    }

    #[test]
    fn remove_reservation_by_id() {
        let mut snapshot = vec![
            reservation("RES-1", "10101", "Kim", 10),
            reservation("RES-2", "10102", "Lee", 20),
        ];
        let removed = remove_reservation(&mut snapshot, &ReservationId::from("RES-1")).unwrap();
        assert_eq!(removed.student_id, "10101");
        assert_eq!(snapshot.len(), 1);
        assert!(remove_reservation(&mut snapshot, &ReservationId::from("RES-9")).is_none());
        assert_eq!(
            snapshot[0].created_at,
            DateTime::<Utc>::from_timestamp(20, 0).unwrap()
        );
    }
}
