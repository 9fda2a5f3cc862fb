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

//! Client-side reservation desk.
//!
//! The desk keeps an in-memory snapshot of today's reservations, runs the
//! rule engines against it, and forwards accepted requests to the store.
//! After a successful write the snapshot is patched right away; the next
//! refresh replaces it with whatever the store holds.
//!
//! Two desks booking the same seat at the same moment can both pass the local
//! check. Nothing here serialises them; the store decides.

use crate::attendance::{AttendanceAction, AttendanceRecord};
use crate::availability::{SeatStatus, seat_map};
use crate::booking::{BookingEngine, BookingRequest};
use crate::cancellation::{CancellationEngine, CancellationRequest, remove_reservation};
use crate::catalog::Catalog;
use crate::error::ReservationError;
use crate::mileage::{DashboardSummary, MileageEntry, aggregate};
use crate::reservation::Reservation;
use crate::store::{CancellationReceipt, ReservationStore, StoreError};
use crate::validator::validate_student_id;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

/// Where check-ins are recorded.
pub const ATTENDANCE_LOCATION: &str = "자기주도학습실";

#[derive(Debug, Error)]
pub enum DeskError {
    /// Refused by the local rules; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] ReservationError),

    /// The store call failed or the store refused the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Teacher dashboard view of the full store contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub today: Vec<Reservation>,
    pub ranking: Vec<MileageEntry>,
    pub summary: DashboardSummary,
}

pub struct ReservationDesk {
    store: Arc<dyn ReservationStore>,
    booking: BookingEngine,
    cancellation: CancellationEngine,
    snapshot: RwLock<Vec<Reservation>>,
}

impl ReservationDesk {
    pub fn new(catalog: Catalog, store: Arc<dyn ReservationStore>) -> Self {
        Self {
            store,
            cancellation: CancellationEngine::new(catalog.student_ids),
            booking: BookingEngine::new(catalog),
            snapshot: RwLock::new(Vec::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.booking.catalog()
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Vec<Reservation> {
        self.snapshot.read().clone()
    }

    /// Replaces the snapshot with the store's reservations for `today`.
    ///
    /// On failure the previous snapshot is kept untouched; a failed read is
    /// "no data", not "no reservations".
    pub async fn refresh(&self, today: NaiveDate) -> Result<usize, StoreError> {
        let reservations = self.store.fetch_today_snapshot(today).await?;
        let count = reservations.len();
        *self.snapshot.write() = reservations;
        debug!("snapshot refreshed with {count} reservations for {today}");
        Ok(count)
    }

    /// Seats for `location` during `slot_id`, as seen in the snapshot.
    pub fn seat_map(&self, location: &str, slot_id: &str) -> Vec<SeatStatus> {
        let Some(slot) = self.catalog().time_slot(slot_id) else {
            return Vec::new();
        };
        seat_map(self.catalog(), &self.snapshot.read(), location, &slot.label)
    }

    /// Decides locally, persists, then appends to the snapshot.
    pub async fn book<Tz: TimeZone>(
        &self,
        request: &BookingRequest,
        now: &DateTime<Tz>,
    ) -> Result<Reservation, DeskError> {
        let reservation = {
            let snapshot = self.snapshot.read();
            self.booking.decide(request, now, &snapshot)?
        };

        self.store.submit_reservation(&reservation).await?;
        self.snapshot.write().push(reservation.clone());
        info!(
            "booked {} for {} ({} {} {})",
            reservation.reservation_id,
            reservation.student_id,
            reservation.location,
            reservation.seat,
            reservation.time_slot
        );
        Ok(reservation)
    }

    /// Matches locally, asks the store to cancel, then drops the row the
    /// store reports as removed.
    pub async fn cancel(&self, request: &CancellationRequest) -> Result<CancellationReceipt, DeskError> {
        let target = {
            let snapshot = self.snapshot.read();
            self.cancellation.decide(request, &snapshot)?.reservation_id.clone()
        };

        let receipt = self
            .store
            .submit_cancellation(&target, request.student_id.trim(), request.name.trim())
            .await?;
        remove_reservation(&mut self.snapshot.write(), &receipt.reservation_id);
        info!("cancelled {}", receipt.reservation_id);
        Ok(receipt)
    }

    /// Validates and records a check-in or check-out.
    pub async fn record_attendance(
        &self,
        student_id: &str,
        name: &str,
        action: AttendanceAction,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DeskError> {
        let student_id = student_id.trim();
        let name = name.trim();
        if student_id.is_empty() || name.is_empty() {
            return Err(ReservationError::MissingRequiredField.into());
        }
        validate_student_id(student_id, &self.catalog().student_ids)
            .map_err(ReservationError::from)?;

        let record = AttendanceRecord {
            student_id: student_id.to_string(),
            name: name.to_string(),
            action,
            timestamp: now,
            location: ATTENDANCE_LOCATION.to_string(),
        };
        self.store.submit_attendance(&record).await?;
        info!("{} recorded for {}", action, student_id);
        Ok(record)
    }

    /// Loads everything and derives the dashboard for `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, StoreError> {
        let full = self.store.fetch_full_snapshot().await?;
        let summary = DashboardSummary::new(&full.reservations, &full.attendance, today);
        let ranking = aggregate(&full.reservations, &full.attendance);
        let today = full
            .reservations
            .into_iter()
            .filter(|r| r.date == today)
            .collect();
        Ok(Dashboard {
            today,
            ranking,
            summary,
        })
    }

    /// Re-reads the snapshot every `period` in the background, for the date
    /// `today` returns at each tick.
    ///
    /// Failures are logged and otherwise ignored; the stale snapshot stays.
    pub fn spawn_refresher<F>(self: &Arc<Self>, period: Duration, today: F) -> JoinHandle<()>
    where
        F: Fn() -> NaiveDate + Send + 'static,
    {
        let desk = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Err(e) = desk.refresh(today()).await {
                    warn!("background refresh failed: {e}");
                }
            }
        })
    }
}
