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

//! In-process stand-in for the spreadsheet script endpoint.
//!
//! Speaks the same `{"action": ...}` protocol over `POST /exec` and, like the
//! real sheet, is the final arbiter: it refuses a second row for an already
//! booked (date, location, seat, slot).

#![allow(dead_code)]

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Default)]
pub struct Sheet {
    pub reservations: Vec<Value>,
    pub attendance: Vec<Value>,
    pub requests: Vec<Value>,
}

pub type SharedSheet = Arc<Mutex<Sheet>>;

fn text(row: &[Value], i: usize) -> String {
    row.get(i).and_then(Value::as_str).unwrap_or_default().to_string()
}

async fn exec(State(sheet): State<SharedSheet>, body: String) -> (StatusCode, Json<Value>) {
    let Ok(request) = serde_json::from_str::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "success": false })));
    };
    let mut sheet = sheet.lock();
    sheet.requests.push(request.clone());

    let action = request["action"].as_str().unwrap_or_default();
    let response = match action {
        "getTodayReservations" => {
            let date = request["date"].as_str().unwrap_or_default();
            let today: Vec<Value> = sheet
                .reservations
                .iter()
                .filter(|r| r["date"] == date)
                .cloned()
                .collect();
            json!({ "success": true, "reservations": today })
        }
        "getFullData" => json!({
            "success": true,
            "reservations": sheet.reservations,
            "attendance": sheet.attendance,
        }),
        "saveReservation" => {
            let row = request["data"].as_array().cloned().unwrap_or_default();
            let row = json!({
                "date": text(&row, 0),
                "studentId": text(&row, 1),
                "name": text(&row, 2),
                "location": text(&row, 3),
                "seat": text(&row, 4),
                "timeSlot": text(&row, 5),
                "reservationId": text(&row, 6),
                "timestamp": text(&row, 7),
                "teamMembersString": text(&row, 8),
            });
            let duplicate = row["seat"] != "팀룸"
                && sheet.reservations.iter().any(|r| {
                    r["date"] == row["date"]
                        && r["location"] == row["location"]
                        && r["seat"] == row["seat"]
                        && r["timeSlot"] == row["timeSlot"]
                });
            if duplicate {
                json!({ "success": false, "reason": "좌석 중복", "message": "이미 예약된 좌석입니다." })
            } else {
                let id = row["reservationId"].clone();
                sheet.reservations.push(row);
                json!({ "success": true, "reservationId": id })
            }
        }
        "cancelReservation" => {
            let position = sheet.reservations.iter().position(|r| {
                r["reservationId"] == request["reservationId"]
                    && r["studentId"] == request["studentId"]
                    && r["name"] == request["name"]
            });
            match position {
                Some(i) => {
                    let removed = sheet.reservations.remove(i);
                    json!({ "success": true, "details": removed })
                }
                None => json!({ "success": false, "reason": "예약 없음", "message": "예약을 찾을 수 없습니다." }),
            }
        }
        "saveAttendance" => {
            let row = request["data"].as_array().cloned().unwrap_or_default();
            sheet.attendance.push(json!({
                "studentId": text(&row, 1),
                "name": text(&row, 2),
                "action": text(&row, 3),
                "timestamp": text(&row, 4),
                "location": text(&row, 5),
            }));
            json!({ "success": true })
        }
        _ => json!({ "success": false, "reason": "unknown action" }),
    };
    (StatusCode::OK, Json(response))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

/// Mock script bound to an ephemeral port.
pub struct MockScript {
    pub base_url: String,
    pub sheet: SharedSheet,
}

impl MockScript {
    pub async fn start() -> Self {
        let sheet = SharedSheet::default();
        let app = Router::new()
            .route("/exec", post(exec))
            .route("/broken", post(broken))
            .route("/garbage", post(garbage))
            .with_state(sheet.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            sheet,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/exec", self.base_url)
    }
}
