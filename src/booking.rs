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

//! Booking decisions.
//!
//! [`BookingEngine::decide`] runs the checks in a fixed order and stops at
//! the first failure:
//!
//! | Step | Check | Error |
//! |------|-------|-------|
//! | 1 | some slot still open, and the chosen one too | [`ReservationError::SlotWindowClosed`] |
//! | 2 | location, slot, student id, name present | [`ReservationError::MissingRequiredField`] |
//! | 3 | student id valid | [`ReservationError::InvalidStudentId`] |
//! | - | slot id known | [`ReservationError::UnknownTimeSlot`] |
//! | - | location known | [`ReservationError::UnknownLocation`] |
//! | 4 | seat rooms: seat chosen | [`ReservationError::SeatRequired`] |
//! | - | seat rooms: seat is one of `1..=N` | [`ReservationError::InvalidSeat`] |
//! | 5 | seat rooms: seat free for the slot | [`ReservationError::SeatTaken`] |
//! | 6 | team rooms: at least one valid member | [`ReservationError::TeamRequired`] |
//!
//! The engine never persists anything. On acceptance it returns the new
//! [`Reservation`]; the caller stores it and appends it to its snapshot. The
//! snapshot may be stale, so the store can still refuse a booking that
//! passed here.

use crate::availability::{is_seat_available, is_valid_seat};
use crate::base::ReservationIdGenerator;
use crate::catalog::{Catalog, LocationKind};
use crate::error::ReservationError;
use crate::reservation::{Reservation, TeamMember};
use crate::validator::{bookable_slots, is_slot_booking_allowed, validate_student_id};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// A booking as submitted from the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub location: String,
    /// Seat number, empty for team rooms.
    #[serde(default)]
    pub seat: String,
    pub time_slot_id: String,
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

pub struct BookingEngine {
    catalog: Catalog,
    ids: &'static ReservationIdGenerator,
}

impl BookingEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ids: ReservationIdGenerator::global(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Decides `request` against `snapshot` at wall-clock time `now`.
    ///
    /// Slot gating uses the local time of `now` in its own time zone, and the
    /// reservation is dated with its local date.
    ///
    /// # Errors
    ///
    /// See the module table; the first failing check wins.
    pub fn decide<Tz: TimeZone>(
        &self,
        request: &BookingRequest,
        now: &DateTime<Tz>,
        snapshot: &[Reservation],
    ) -> Result<Reservation, ReservationError> {
        let result = self.check(request, now, snapshot);
        match &result {
            Ok(reservation) => debug!(
                "accepted booking {} for {} at {} seat {:?} ({})",
                reservation.reservation_id,
                reservation.student_id,
                reservation.location,
                reservation.seat,
                reservation.time_slot
            ),
            Err(e) => debug!("rejected booking for {:?}: {}", request.student_id, e),
        }
        result
    }

    fn check<Tz: TimeZone>(
        &self,
        request: &BookingRequest,
        now: &DateTime<Tz>,
        snapshot: &[Reservation],
    ) -> Result<Reservation, ReservationError> {
        let wall_clock = now.time();
        if bookable_slots(&self.catalog, wall_clock).is_empty()
            || !is_slot_booking_allowed(&self.catalog, &request.time_slot_id, wall_clock)
        {
            return Err(ReservationError::SlotWindowClosed);
        }

        let location = request.location.trim();
        let student_id = request.student_id.trim();
        let name = request.name.trim();
        if location.is_empty()
            || request.time_slot_id.trim().is_empty()
            || student_id.is_empty()
            || name.is_empty()
        {
            return Err(ReservationError::MissingRequiredField);
        }

        validate_student_id(student_id, &self.catalog.student_ids)?;

        let slot = self
            .catalog
            .time_slot(request.time_slot_id.trim())
            .ok_or(ReservationError::UnknownTimeSlot)?;

        let kind = self
            .catalog
            .location(location)
            .map(|l| l.kind)
            .ok_or(ReservationError::UnknownLocation)?;

        let team_members = TeamMember::filter_valid(&request.team_members);
        let seat = if kind == LocationKind::TeamRoom {
            if team_members.is_empty() {
                return Err(ReservationError::TeamRequired);
            }
            String::new()
        } else {
            let seat = request.seat.trim();
            if seat.is_empty() {
                return Err(ReservationError::SeatRequired);
            }
            if !is_valid_seat(&self.catalog, location, seat) {
                return Err(ReservationError::InvalidSeat);
            }
            if !is_seat_available(snapshot, location, seat, &slot.label) {
                return Err(ReservationError::SeatTaken);
            }
            seat.to_string()
        };

        let created_at = now.with_timezone(&Utc);
        Ok(Reservation {
            date: now.date_naive(),
            student_id: student_id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            seat,
            time_slot: slot.label.clone(),
            reservation_id: self.ids.next(created_at),
            created_at,
            team_members,
        })
    }
}
