use std::fmt;

use chrono::{DateTime, Duration, Utc};
use coach_core::model::{FinalReportStatus, Profile, SessionId, SessionRecord, UserId};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    participants: u32,
    sessions_each: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidParticipants { raw: String },
    InvalidSessions { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidParticipants { raw } => {
                write!(f, "invalid --participants value: {raw}")
            }
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("COACH_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut participants = std::env::var("COACH_SEED_PARTICIPANTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(6);
        let mut sessions_each = std::env::var("COACH_SEED_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--participants" => {
                    let value = require_value(&mut args, "--participants")?;
                    participants = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidParticipants { raw: value.clone() })?;
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions_each = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            participants,
            sessions_each,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>       SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --participants <n>      Number of demo participants (default: 6)");
    eprintln!("  --sessions <n>          Completed sessions per participant (default: 3)");
    eprintln!("  --now <rfc3339>         Fixed current time for deterministic seeding");
    eprintln!("  -h, --help              Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  COACH_DB_URL, COACH_SEED_PARTICIPANTS, COACH_SEED_SESSIONS");
}

/// Spreads participant `i` across the journey stages so every milestone
/// state shows up in the admin panel.
fn profile_at(i: u32, now: DateTime<Utc>) -> Profile {
    let stage = i % 6;
    let mut profile = Profile {
        masterclass_datetime: Some((now + Duration::days(7)).to_rfc3339()),
        masterclass_location: Some("Campus West, Hall 2".into()),
        launch_huddle_datetime: Some((now + Duration::days(45)).to_rfc3339()),
        launch_huddle_location: Some("Main Auditorium".into()),
        ..Profile::default()
    };
    if stage >= 1 {
        profile.baseline_completed = true;
    }
    if stage >= 2 {
        profile.masterclass_attended = true;
    }
    if stage >= 4 {
        profile.post_survey_completed = true;
    }
    if stage >= 5 {
        profile.final_report_status = FinalReportStatus::Generated;
    }
    profile
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut sessions_written = 0_u32;
    for i in 0..args.participants {
        let user = UserId::generate();
        let profile = profile_at(i, now);
        storage.profiles.upsert_profile(user, &profile).await?;

        if profile.baseline_completed {
            let started = now - Duration::days(30);
            let mut baseline = SessionRecord::start(SessionId::generate(), user, true, started);
            baseline.complete(started + Duration::minutes(12))?;
            storage.sessions.insert_session(&baseline).await?;
            sessions_written += 1;
        }

        // Participants past the masterclass get completed sessions; the
        // quota stage (3+) gets the full count.
        let count = match i % 6 {
            0 | 1 => 0,
            2 => args.sessions_each.saturating_sub(1),
            _ => args.sessions_each,
        };
        for s in 0..count {
            let started = now - Duration::days(i64::from(count - s) * 3);
            let mut session = SessionRecord::start(SessionId::generate(), user, false, started);
            session.set_audio_object(format!("recordings/{user}/{s}.webm"));
            session.complete(started + Duration::minutes(45))?;
            storage.sessions.insert_session(&session).await?;
            sessions_written += 1;
        }
    }

    println!(
        "Seeded {} participants and {} sessions into {}",
        args.participants, sessions_written, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
