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

//! Client for the spreadsheet script endpoint that owns all durable state.
//!
//! Every call is a single `POST` of `{"action": ..., ...fields}` to the
//! script URL, with the JSON body sent as `text/plain`.
//!
//! The store is the only arbiter of final acceptance. A booking that passed
//! the local rules against a stale snapshot may still be refused here.

use crate::attendance::AttendanceRecord;
use crate::base::ReservationId;
use crate::reservation::Reservation;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{error, warn};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Sheet marker written in the seat column for team-room bookings.
pub const TEAM_ROOM_SEAT: &str = "팀룸";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{action} failed with HTTP status {status}")]
    Status { action: String, status: u16 },

    #[error("invalid response format from store: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("store rejected request ({reason}): {message}")]
    Rejected { reason: String, message: String },
}

impl StoreError {
    /// The endpoint could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_connect() || e.is_timeout())
    }

    /// Text for the user. Connectivity failures get a translated hint;
    /// everything else is passed through unchanged.
    pub fn user_message(&self) -> String {
        if self.is_connectivity() {
            "서버 연결에 실패했습니다. 네트워크 연결을 확인하거나 스크립트 배포 설정을 확인해주세요."
                .to_string()
        } else {
            self.to_string()
        }
    }
}

/// Everything the dashboard reads: all reservations plus the attendance log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullSnapshot {
    pub reservations: Vec<Reservation>,
    pub attendance: Vec<AttendanceRecord>,
}

/// What the store reports after a successful cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationReceipt {
    /// Id of the row the store actually removed.
    pub reservation_id: ReservationId,
    pub details: Value,
}

/// Read and write operations against the persistent store.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Reservations dated `date`. A refused read yields an empty list.
    async fn fetch_today_snapshot(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    async fn fetch_full_snapshot(&self) -> Result<FullSnapshot, StoreError>;

    /// Persists `reservation`, returning the id the store recorded.
    async fn submit_reservation(&self, reservation: &Reservation)
    -> Result<ReservationId, StoreError>;

    async fn submit_cancellation(
        &self,
        reservation_id: &ReservationId,
        student_id: &str,
        name: &str,
    ) -> Result<CancellationReceipt, StoreError>;

    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError>;
}

/// Response envelope shared by every action.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Envelope {
    success: bool,
    reservations: Vec<Value>,
    attendance: Vec<Value>,
    reservation_id: Option<ReservationId>,
    details: Option<Value>,
    reason: Option<String>,
    message: Option<String>,
}

impl Envelope {
    fn rejected(self, reason: &str, message: &str) -> StoreError {
        StoreError::Rejected {
            reason: self.reason.unwrap_or_else(|| reason.to_string()),
            message: self.message.unwrap_or_else(|| message.to_string()),
        }
    }
}

/// Decodes each row on its own; a malformed row is logged and dropped so
/// the rest of the sheet still loads.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, kind: &str) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("skipping malformed {kind} row {row}: {e}");
                None
            }
        })
        .collect()
}

/// Sheet row for `saveReservation`.
pub fn reservation_row(reservation: &Reservation) -> Vec<Value> {
    let seat = if reservation.seat.is_empty() {
        TEAM_ROOM_SEAT
    } else {
        reservation.seat.as_str()
    };
    vec![
        json!(reservation.date.to_string()),
        json!(reservation.student_id),
        json!(reservation.name),
        json!(reservation.location),
        json!(seat),
        json!(reservation.time_slot),
        json!(reservation.reservation_id),
        json!(reservation.created_at.to_rfc3339()),
        json!(reservation.team_members_string()),
    ]
}

/// Sheet row for `saveAttendance`.
pub fn attendance_row(record: &AttendanceRecord) -> Vec<Value> {
    vec![
        json!(record.timestamp.date_naive().to_string()),
        json!(record.student_id),
        json!(record.name),
        json!(record.action.sheet_label()),
        json!(record.timestamp.to_rfc3339()),
        json!(record.location),
    ]
}

/// [`ReservationStore`] backed by the deployed script over HTTP.
#[derive(Clone)]
pub struct ScriptStore {
    client: Client,
    url: String,
}

impl ScriptStore {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn post_action(&self, action: &str, fields: Value) -> Result<Envelope, StoreError> {
        let mut body = json!({ "action": action });
        if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), fields) {
            body.extend(fields);
        }

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .inspect_err(|e| error!("store {action} request failed: {e}"))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!("store {action} error: {status} {text}");
            return Err(StoreError::Status {
                action: action.to_string(),
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("failed to parse store {action} response: {text}");
            StoreError::InvalidResponse(e)
        })
    }
}

#[async_trait]
impl ReservationStore for ScriptStore {
    async fn fetch_today_snapshot(&self, date: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        let envelope = self
            .post_action("getTodayReservations", json!({ "date": date.to_string() }))
            .await?;
        if !envelope.success {
            warn!("store refused getTodayReservations for {date}");
            return Ok(Vec::new());
        }
        Ok(decode_rows(envelope.reservations, "reservation"))
    }

    async fn fetch_full_snapshot(&self) -> Result<FullSnapshot, StoreError> {
        let envelope = self.post_action("getFullData", json!({})).await?;
        if !envelope.success {
            warn!("store refused getFullData");
            return Ok(FullSnapshot::default());
        }
        Ok(FullSnapshot {
            reservations: decode_rows(envelope.reservations, "reservation"),
            attendance: decode_rows(envelope.attendance, "attendance"),
        })
    }

    async fn submit_reservation(
        &self,
        reservation: &Reservation,
    ) -> Result<ReservationId, StoreError> {
        let envelope = self
            .post_action("saveReservation", json!({ "data": reservation_row(reservation) }))
            .await?;
        if !envelope.success {
            return Err(envelope.rejected("저장 실패", "예약 중 오류가 발생했습니다."));
        }
        Ok(envelope
            .reservation_id
            .unwrap_or_else(|| reservation.reservation_id.clone()))
    }

    async fn submit_cancellation(
        &self,
        reservation_id: &ReservationId,
        student_id: &str,
        name: &str,
    ) -> Result<CancellationReceipt, StoreError> {
        let envelope = self
            .post_action(
                "cancelReservation",
                json!({
                    "reservationId": reservation_id,
                    "studentId": student_id,
                    "name": name,
                }),
            )
            .await?;
        if !envelope.success {
            return Err(envelope.rejected("예약 없음", "예약 취소에 실패했습니다."));
        }

        let details = envelope.details.unwrap_or(Value::Null);
        let removed = details
            .get("reservationId")
            .and_then(Value::as_str)
            .map(ReservationId::from)
            .unwrap_or_else(|| reservation_id.clone());
        Ok(CancellationReceipt {
            reservation_id: removed,
            details,
        })
    }

    async fn submit_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let envelope = self
            .post_action("saveAttendance", json!({ "data": attendance_row(record) }))
            .await?;
        if !envelope.success {
            return Err(envelope.rejected("저장 실패", "처리 중 오류가 발생했습니다."));
        }
        Ok(())
    }
}
