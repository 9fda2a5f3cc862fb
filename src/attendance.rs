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

//! Attendance log entries.
//!
//! The log is append-only. Whether a student is currently present is derived
//! from it (see [`crate::mileage::currently_present`]), never stored.

use crate::reservation::{lenient_timestamp, stringly};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceAction {
    #[serde(alias = "체크인")]
    Checkin,
    #[serde(alias = "체크아웃")]
    Checkout,
}

impl AttendanceAction {
    /// Label written to the attendance sheet.
    pub fn sheet_label(&self) -> &'static str {
        match self {
            Self::Checkin => "체크인",
            Self::Checkout => "체크아웃",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkin => write!(f, "checkin"),
            Self::Checkout => write!(f, "checkout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(deserialize_with = "stringly")]
    pub student_id: String,
    #[serde(deserialize_with = "stringly")]
    pub name: String,
    pub action: AttendanceAction,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
}

impl AttendanceRecord {
    pub fn is_checkin(&self) -> bool {
        self.action == AttendanceAction::Checkin
    }
}
