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

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Trim, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use studyroom_reservation::mileage::aggregate;
use studyroom_reservation::reservation::parse_timestamp;
use studyroom_reservation::validator::bookable_slots;
use studyroom_reservation::{
    AppConfig, AttendanceAction, AttendanceRecord, BookingRequest, CancellationRequest, Catalog,
    DeskError, MileageEntry, Reservation, ReservationDesk, ReservationId, ScriptStore, TeamMember,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Study Room Reservations - book seats, cancel, check in, rank mileage
///
/// Talks to the spreadsheet script configured as `store.url` in
/// studyroom.toml or STUDYROOM_STORE__URL.
#[derive(Parser, Debug)]
#[command(name = "studyroom")]
#[command(about = "Study room seat reservations backed by a spreadsheet script", long_about = None)]
struct Args {
    /// Config file (defaults to ./studyroom.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List time slots that can still be booked now
    Slots,
    /// Show the seat map of a location for one slot
    Seats {
        #[arg(long)]
        location: String,
        #[arg(long, value_name = "SLOT_ID")]
        slot: String,
    },
    /// Book a seat, or a team room with --member
    Book {
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        seat: String,
        #[arg(long, value_name = "SLOT_ID")]
        slot: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        /// Team member as STUDENT_ID:NAME (repeatable)
        #[arg(long = "member", value_name = "STUDENT_ID:NAME", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },
    /// Cancel your most recent reservation, or a specific one
    Cancel {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        reservation_id: Option<String>,
    },
    /// Check in to the study room
    Checkin {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
    },
    /// Check out of the study room
    Checkout {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
    },
    /// List today's reservations
    Today,
    /// Show today's counts and the mileage ranking
    Dashboard,
    /// Write the mileage ranking as CSV to stdout
    ///
    /// Reads from the store unless both CSV exports are given.
    Mileage {
        /// Reservation export: date,studentId,name,location,seat,timeSlot,reservationId,timestamp
        #[arg(long, value_name = "FILE", requires = "attendance")]
        reservations: Option<PathBuf>,
        /// Attendance export: studentId,name,action,timestamp,location
        #[arg(long, value_name = "FILE", requires = "reservations")]
        attendance: Option<PathBuf>,
    },
}

fn parse_member(value: &str) -> Result<TeamMember, String> {
    let (student_id, name) = value
        .split_once(':')
        .ok_or_else(|| format!("expected STUDENT_ID:NAME, got {value:?}"))?;
    Ok(TeamMember::new(student_id.trim(), name.trim()))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logger() {
        eprintln!("Error initialising logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Logs go to stderr so CSV output on stdout stays clean.
fn init_logger() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    match args.command {
        Command::Slots => {
            print_slots(&config.catalog);
            Ok(())
        }
        Command::Mileage {
            reservations: Some(reservations),
            attendance: Some(attendance),
        } => {
            let reservations = read_reservations(open(&reservations)?)?;
            let attendance = read_attendance(open(&attendance)?)?;
            write_ranking(&aggregate(&reservations, &attendance), std::io::stdout())?;
            Ok(())
        }
        command => {
            let url = config.store_url()?;
            let store = ScriptStore::new(url, config.store.timeout())?;
            let desk = ReservationDesk::new(config.catalog.clone(), Arc::new(store));
            run_online(&desk, command).await
        }
    }
}

async fn run_online(desk: &ReservationDesk, command: Command) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        Command::Slots => print_slots(desk.catalog()),
        Command::Seats { location, slot } => {
            refresh(desk, today).await?;
            let map = desk.seat_map(&location, &slot);
            if map.is_empty() {
                println!("{location}: 번호 좌석이 없습니다.");
            }
            for status in map {
                let mark = if status.available { "○" } else { "●" };
                println!("{:>3} {}", status.seat, mark);
            }
        }
        Command::Book {
            location,
            seat,
            slot,
            student_id,
            name,
            members,
        } => {
            refresh(desk, today).await?;
            let request = BookingRequest {
                location,
                seat,
                time_slot_id: slot,
                student_id,
                name,
                team_members: members,
            };
            let reservation = desk.book(&request, &Local::now()).await.map_err(explain)?;
            println!("예약이 완료되었습니다! ({})", reservation.reservation_id);
            print_reservation(&reservation);
        }
        Command::Cancel {
            student_id,
            name,
            reservation_id,
        } => {
            refresh(desk, today).await?;
            let request = CancellationRequest {
                reservation_id: reservation_id.map(ReservationId),
                student_id,
                name,
            };
            let receipt = desk.cancel(&request).await.map_err(explain)?;
            println!("예약이 성공적으로 취소되었습니다. ({})", receipt.reservation_id);
        }
        Command::Checkin { student_id, name } => {
            attend(desk, &student_id, &name, AttendanceAction::Checkin).await?;
        }
        Command::Checkout { student_id, name } => {
            attend(desk, &student_id, &name, AttendanceAction::Checkout).await?;
        }
        Command::Today => {
            refresh(desk, today).await?;
            for reservation in desk.snapshot() {
                print_reservation(&reservation);
            }
        }
        Command::Dashboard => {
            let dashboard = desk
                .dashboard(today)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!(
                "당일 예약: {}  총 출석: {}  현재 학습중: {}",
                dashboard.summary.today_reservations,
                dashboard.summary.total_attendance,
                dashboard.summary.currently_studying
            );
            for entry in &dashboard.ranking {
                println!(
                    "{:>4} {} {} {}점 (예약 {}, 출석 {})",
                    rank_badge(entry.rank),
                    entry.student_id,
                    entry.name,
                    entry.total_mileage,
                    entry.reservation_count,
                    entry.attendance_count
                );
            }
        }
        Command::Mileage { .. } => {
            let dashboard = desk
                .dashboard(today)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            write_ranking(&dashboard.ranking, std::io::stdout())?;
        }
    }
    Ok(())
}

async fn refresh(desk: &ReservationDesk, today: NaiveDate) -> Result<()> {
    desk.refresh(today)
        .await
        .map_err(|e| anyhow!("예약 정보를 불러오는 데 실패했습니다: {}", e.user_message()))?;
    Ok(())
}

async fn attend(
    desk: &ReservationDesk,
    student_id: &str,
    name: &str,
    action: AttendanceAction,
) -> Result<()> {
    let record = desk
        .record_attendance(student_id, name, action, Utc::now())
        .await
        .map_err(explain)?;
    println!(
        "{}이(가) 완료되었습니다! {} {}",
        record.action.sheet_label(),
        record.name,
        record.timestamp.with_timezone(&Local).format("%H:%M:%S")
    );
    Ok(())
}

/// Turns a desk failure into the message the student should see.
fn explain(error: DeskError) -> anyhow::Error {
    match error {
        DeskError::Rejected(e) => anyhow!("{} ({})", e.localized(), e.reason()),
        DeskError::Store(e) => anyhow!(e.user_message()),
    }
}

fn print_slots(catalog: &Catalog) {
    let slots = bookable_slots(catalog, Local::now().time());
    if slots.is_empty() {
        println!("오늘 예약 가능한 시간대가 없습니다.");
    }
    for slot in slots {
        println!("{:<8} {:<6} {}", slot.id, slot.label, slot.time);
    }
}

fn print_reservation(reservation: &Reservation) {
    let roster = reservation.team_members_string();
    println!(
        "{} {} {} {} {} {}",
        reservation.student_id,
        reservation.name,
        reservation.location,
        reservation.seat,
        reservation.time_slot,
        if roster.is_empty() { "-" } else { roster.as_str() }
    );
}

fn rank_badge(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => n.to_string(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    Ok(BufReader::new(file))
}

/// Reservation export row.
///
/// Fields: `date, studentId, name, location, seat, timeSlot, reservationId,
/// timestamp[, teamMembers]`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationCsvRecord {
    date: NaiveDate,
    student_id: String,
    name: String,
    location: String,
    #[serde(default)]
    seat: String,
    time_slot: String,
    reservation_id: String,
    timestamp: String,
    #[serde(default)]
    team_members: String,
}

impl ReservationCsvRecord {
    fn into_reservation(self) -> Reservation {
        Reservation {
            date: self.date,
            student_id: self.student_id,
            name: self.name,
            location: self.location,
            seat: self.seat,
            time_slot: self.time_slot,
            reservation_id: ReservationId(self.reservation_id),
            created_at: parse_timestamp(&self.timestamp).unwrap_or_default(),
            team_members: TeamMember::parse_roster(&self.team_members),
        }
    }
}

/// Attendance export row.
///
/// Fields: `studentId, name, action, timestamp[, location]`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceCsvRecord {
    student_id: String,
    name: String,
    action: AttendanceAction,
    timestamp: String,
    #[serde(default)]
    location: String,
}

impl AttendanceCsvRecord {
    fn into_record(self) -> Option<AttendanceRecord> {
        Some(AttendanceRecord {
            timestamp: parse_timestamp(&self.timestamp)?,
            student_id: self.student_id,
            name: self.name,
            action: self.action,
            location: self.location,
        })
    }
}

/// Reads a reservation export, skipping malformed rows.
pub fn read_reservations<R: Read>(reader: R) -> Result<Vec<Reservation>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut reservations = Vec::new();
    for result in rdr.deserialize::<ReservationCsvRecord>() {
        match result {
            Ok(record) => reservations.push(record.into_reservation()),
            Err(e) => log::warn!("skipping malformed reservation row: {e}"),
        }
    }
    Ok(reservations)
}

/// Reads an attendance export, skipping malformed rows and rows whose
/// timestamp cannot be parsed (presence depends on ordering).
pub fn read_attendance<R: Read>(reader: R) -> Result<Vec<AttendanceRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize::<AttendanceCsvRecord>() {
        match result.map(AttendanceCsvRecord::into_record) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => log::warn!("skipping attendance row with unreadable timestamp"),
            Err(e) => log::warn!("skipping malformed attendance row: {e}"),
        }
    }
    Ok(records)
}

/// Writes the ranking as CSV.
///
/// Columns: `rank, studentId, name, totalMileage, reservationCount, attendanceCount`
pub fn write_ranking<W: Write>(ranking: &[MileageEntry], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for entry in ranking {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}
