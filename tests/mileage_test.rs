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

//! Mileage ranking integration tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use studyroom_reservation::mileage::{aggregate, currently_present};
use studyroom_reservation::{
    AttendanceAction, AttendanceRecord, DashboardSummary, Reservation, ReservationId,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_741_000_000 + secs, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn make_reservation(student_id: &str, name: &str, date: NaiveDate) -> Reservation {
    Reservation {
        date,
        student_id: student_id.to_string(),
        name: name.to_string(),
        location: "영글터 자율학습실".to_string(),
        seat: "4".to_string(),
        time_slot: "야자1부".to_string(),
        reservation_id: ReservationId::from(format!("RES-{student_id}-{date}").as_str()),
        created_at: at(0),
        team_members: Vec::new(),
    }
}

fn make_record(student_id: &str, name: &str, action: AttendanceAction, secs: i64) -> AttendanceRecord {
    AttendanceRecord {
        student_id: student_id.to_string(),
        name: name.to_string(),
        action,
        timestamp: at(secs),
        location: "자기주도학습실".to_string(),
    }
}

#[test]
fn ranks_by_total_mileage() {
    let reservations = vec![
        make_reservation("10101", "A", day(3)),
        make_reservation("10101", "A", day(4)),
        make_reservation("10102", "B", day(4)),
    ];
    let attendance = vec![
        make_record("10101", "A", AttendanceAction::Checkin, 10),
        make_record("10102", "B", AttendanceAction::Checkin, 20),
        make_record("10102", "B", AttendanceAction::Checkout, 30),
    ];

    let ranking = aggregate(&reservations, &attendance);
    assert_eq!(ranking.len(), 2);

    assert_eq!(ranking[0].rank, 1);
    assert_eq!(ranking[0].student_id, "10101");
    assert_eq!(ranking[0].total_mileage, 3);
    assert_eq!(ranking[0].reservation_count, 2);
    assert_eq!(ranking[0].attendance_count, 1);

    assert_eq!(ranking[1].rank, 2);
    assert_eq!(ranking[1].student_id, "10102");
    assert_eq!(ranking[1].total_mileage, 2);
    assert_eq!(ranking[1].attendance_count, 1);
}

#[test]
fn checkouts_earn_nothing() {
    let attendance = vec![
        make_record("10101", "A", AttendanceAction::Checkin, 10),
        make_record("10101", "A", AttendanceAction::Checkout, 20),
        make_record("10103", "C", AttendanceAction::Checkout, 30),
    ];

    let ranking = aggregate(&[], &attendance);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].total_mileage, 1);
}

#[test]
fn aggregation_is_repeatable() {
    let reservations = vec![
        make_reservation("10102", "B", day(4)),
        make_reservation("10101", "A", day(4)),
    ];
    let attendance = vec![make_record("10103", "C", AttendanceAction::Checkin, 0)];

    let first = aggregate(&reservations, &attendance);
    let second = aggregate(&reservations, &attendance);
    assert_eq!(first, second);

    // equal totals keep first-seen order
    let order: Vec<&str> = first.iter().map(|e| e.student_id.as_str()).collect();
    assert_eq!(order, ["10102", "10101", "10103"]);
}

#[test]
fn displayed_name_is_last_seen() {
    let reservations = vec![
        make_reservation("10101", "Kim", day(3)),
        make_reservation("10101", "Kim Minji", day(4)),
    ];
    let ranking = aggregate(&reservations, &[]);
    assert_eq!(ranking[0].name, "Kim Minji");

    let attendance = vec![make_record("10101", "김민지", AttendanceAction::Checkin, 0)];
    let ranking = aggregate(&reservations, &attendance);
    assert_eq!(ranking[0].name, "김민지");
}

#[test]
fn presence_follows_latest_record() {
    let attendance = vec![
        make_record("10101", "A", AttendanceAction::Checkin, 10),
        make_record("10102", "B", AttendanceAction::Checkin, 20),
        make_record("10101", "A", AttendanceAction::Checkout, 30),
        make_record("10103", "C", AttendanceAction::Checkout, 40),
        make_record("10103", "C", AttendanceAction::Checkin, 50),
    ];

    let present: Vec<&str> = currently_present(&attendance)
        .into_iter()
        .map(|r| r.student_id.as_str())
        .collect();
    assert_eq!(present, ["10102", "10103"]);
}

#[test]
fn presence_uses_timestamps_not_log_order() {
    // A late-arriving checkout row with an older timestamp does not end the session.
    let attendance = vec![
        make_record("10101", "A", AttendanceAction::Checkin, 50),
        make_record("10101", "A", AttendanceAction::Checkout, 10),
    ];
    assert_eq!(currently_present(&attendance).len(), 1);
}

#[test]
fn dashboard_summary_counts() {
    let reservations = vec![
        make_reservation("10101", "A", day(3)),
        make_reservation("10101", "A", day(4)),
        make_reservation("10102", "B", day(4)),
    ];
    let attendance = vec![
        make_record("10101", "A", AttendanceAction::Checkin, 10),
        make_record("10101", "A", AttendanceAction::Checkout, 20),
        make_record("10102", "B", AttendanceAction::Checkin, 30),
    ];

    let summary = DashboardSummary::new(&reservations, &attendance, day(4));
    assert_eq!(
        summary,
        DashboardSummary {
            today_reservations: 2,
            total_attendance: 3,
            currently_studying: 1,
        }
    );
}
