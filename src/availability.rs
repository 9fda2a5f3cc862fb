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

//! Seat availability against a snapshot of today's reservations.

use crate::catalog::{Catalog, Location};
use crate::reservation::Reservation;
use serde::Serialize;

/// False iff some reservation in `snapshot` has exactly this location, seat
/// and slot label.
///
/// Team rooms have no seat; callers must not ask about them here.
pub fn is_seat_available(
    snapshot: &[Reservation],
    location: &str,
    seat: &str,
    time_slot_label: &str,
) -> bool {
    !snapshot
        .iter()
        .any(|r| r.is_for(location, seat, time_slot_label))
}

/// Numbered seats at `location` per the catalog; team rooms and unknown
/// names have none.
pub fn seat_count(catalog: &Catalog, location: &str) -> u32 {
    catalog.location(location).map_or(0, Location::seat_count)
}

/// True iff `seat` is written exactly as one of the numbers `1..=N` that
/// [`seat_map`] offers for `location`.
///
/// `"03"`, `"+3"` and `"10"` at a nine-seat room are all rejected, so every
/// seat has a single spelling in the snapshot.
pub fn is_valid_seat(catalog: &Catalog, location: &str, seat: &str) -> bool {
    seat.parse::<u32>().is_ok_and(|n| {
        (1..=seat_count(catalog, location)).contains(&n) && n.to_string() == seat
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatStatus {
    pub seat: String,
    pub available: bool,
}

/// Seats `1..=N` at `location` with their state for one slot.
///
/// Team rooms produce an empty map.
pub fn seat_map(
    catalog: &Catalog,
    snapshot: &[Reservation],
    location: &str,
    time_slot_label: &str,
) -> Vec<SeatStatus> {
    (1..=seat_count(catalog, location))
        .map(|n| {
            let seat = n.to_string();
            let available = is_seat_available(snapshot, location, &seat, time_slot_label);
            SeatStatus { seat, available }
        })
        .collect()
}
