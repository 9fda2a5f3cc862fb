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

//! Error types for booking, cancellation and attendance decisions.

use thiserror::Error;

/// Why a student id failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentIdError {
    /// Not exactly five ASCII digits after trimming
    #[error("student id must be exactly 5 digits")]
    InvalidFormat,

    /// Five digits, but outside the configured numeric range
    #[error("student id is outside the valid range")]
    OutOfRange,
}

/// Decision failures produced by the rule engines.
///
/// Every variant is a plain value so callers can match on the kind and pick
/// the UI response; none of them represent a transport failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Location, slot, student id or name was left empty
    #[error("a required field is missing")]
    MissingRequiredField,

    /// Student id failed validation
    #[error("invalid student id: {0}")]
    InvalidStudentId(#[from] StudentIdError),

    /// No slot is open any more, or the chosen slot has passed its cutoff
    #[error("booking window for this time slot is closed")]
    SlotWindowClosed,

    /// Slot id is not in the catalog
    #[error("unknown time slot")]
    UnknownTimeSlot,

    /// Location is not in the catalog
    #[error("unknown location")]
    UnknownLocation,

    /// Seat room booked without a seat
    #[error("a seat must be selected for this location")]
    SeatRequired,

    /// Seat is not one of the numbered seats `1..=N` of the location
    #[error("no such seat at this location")]
    InvalidSeat,

    /// Seat already reserved for the same slot
    #[error("seat is already reserved for this time slot")]
    SeatTaken,

    /// Team room booked without any valid team member
    #[error("team room requires at least one team member")]
    TeamRequired,

    /// No reservation matches the cancellation request
    #[error("reservation not found")]
    NotFound,
}

impl ReservationError {
    /// Message shown to students on the booking screen.
    pub fn localized(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "모든 필수 항목을 입력해주세요.",
            Self::InvalidStudentId(StudentIdError::InvalidFormat) => {
                "학번은 5자리 숫자여야 합니다."
            }
            Self::InvalidStudentId(StudentIdError::OutOfRange) => {
                "학번이 유효한 범위를 벗어났습니다."
            }
            Self::SlotWindowClosed => "각 시간대는 시작 10분 전까지만 예약 가능합니다.",
            Self::UnknownTimeSlot => "존재하지 않는 시간대입니다.",
            Self::UnknownLocation => "존재하지 않는 장소입니다.",
            Self::SeatRequired => "좌석을 선택해주세요.",
            Self::InvalidSeat => "존재하지 않는 좌석입니다.",
            Self::SeatTaken => "선택하신 좌석이 이미 예약되어 있습니다.",
            Self::TeamRequired => "스터디룸은 최소 1명 이상의 팀원이 필요합니다.",
            Self::NotFound => "일치하는 예약을 찾을 수 없습니다.",
        }
    }

    /// Short reason label recorded next to a failed request.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "입력 정보 부족",
            Self::InvalidStudentId(_) => "학번 형식 오류",
            Self::SlotWindowClosed => "예약 마감",
            Self::UnknownTimeSlot => "시간대 오류",
            Self::UnknownLocation => "장소 오류",
            Self::SeatRequired => "좌석 미선택",
            Self::InvalidSeat => "좌석 번호 오류",
            Self::SeatTaken => "좌석 중복",
            Self::TeamRequired => "팀원 정보 부족",
            Self::NotFound => "예약 없음",
        }
    }
}
