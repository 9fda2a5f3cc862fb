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

//! # Study Room Reservation
//!
//! Booking rules for a school study space: students reserve numbered seats
//! or whole team rooms in fixed daily time slots, cancel them, and check in
//! and out; teachers see today's bookings and a mileage ranking. All durable
//! state lives in an external spreadsheet script reached over HTTP.
//!
//! ## Core Components
//!
//! - [`validator`]: student id and slot-window checks
//! - [`availability`]: seat availability against a snapshot
//! - [`BookingEngine`]: accept/reject decisions for booking requests
//! - [`CancellationEngine`]: matching cancellation requests to reservations
//! - [`mileage`]: ranking and presence derived from snapshots
//! - [`ReservationDesk`]: snapshot-holding client that talks to a [`ReservationStore`]
//!
//! The engines are pure: they read a caller-supplied snapshot and clock and
//! never perform I/O.
//!
//! ## Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use studyroom_reservation::{BookingEngine, BookingRequest, Catalog, Reservation, ReservationError};
//!
//! let engine = BookingEngine::new(Catalog::default());
//! let now = FixedOffset::east_opt(9 * 3600)
//!     .unwrap()
//!     .with_ymd_and_hms(2025, 3, 4, 9, 0, 0)
//!     .unwrap();
//!
//! let request = BookingRequest {
//!     location: "채움터".to_string(),
//!     seat: "3".to_string(),
//!     time_slot_id: "lunch".to_string(),
//!     student_id: "10101".to_string(),
//!     name: "Kim".to_string(),
//!     team_members: Vec::new(),
//! };
//!
//! let mut snapshot: Vec<Reservation> = Vec::new();
//! let reservation = engine.decide(&request, &now, &snapshot).unwrap();
//! snapshot.push(reservation);
//!
//! // Same seat and slot again
//! assert_eq!(
//!     engine.decide(&request, &now, &snapshot),
//!     Err(ReservationError::SeatTaken)
//! );
//! ```

pub mod attendance;
pub mod availability;
mod base;
pub mod booking;
pub mod cancellation;
pub mod catalog;
pub mod config;
pub mod desk;
pub mod error;
pub mod mileage;
pub mod reservation;
pub mod store;
pub mod validator;

pub use attendance::{AttendanceAction, AttendanceRecord};
pub use base::{ReservationId, ReservationIdGenerator};
pub use booking::{BookingEngine, BookingRequest};
pub use cancellation::{CancellationEngine, CancellationRequest};
pub use catalog::{Catalog, Location, LocationKind, StudentIdRange, TimeSlot};
pub use config::AppConfig;
pub use desk::{DeskError, ReservationDesk};
pub use error::{ReservationError, StudentIdError};
pub use mileage::{DashboardSummary, MileageEntry};
pub use reservation::{Reservation, TeamMember};
pub use store::{FullSnapshot, ReservationStore, ScriptStore, StoreError};
