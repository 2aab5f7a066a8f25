use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::info;
use progress_core::model::{ExternalStats, SubmissionDraft};
use services::{AppServices, CalendarZone, Clock, DEFAULT_RECENT_LIMIT, ProgressStoreConfig};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOption { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbPath { raw: String },
    InvalidFormat { raw: String },
    InvalidImport(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOption { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbPath { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidFormat { raw } => {
                write!(f, "invalid --format value (expected json or csv): {raw}")
            }
            ArgsError::InvalidImport(err) => write!(f, "invalid import payload: {err}"),
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <path>] stats");
    eprintln!("  app [--db <path>] recent [--limit <n>]");
    eprintln!(
        "  app [--db <path>] submit --title <t> --score <s> --correct <c> --total <n> \
         [--quiz-id <id>] [--time <secs>]"
    );
    eprintln!("  app [--db <path>] import '<backend stats json>'");
    eprintln!("  app [--db <path>] export [--format json|csv]");
    eprintln!("  app [--db <path>] reset");
    eprintln!("  app [--db <path>] seed");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db progress.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_PATH, PROGRESS_UTC=1 (count streak days in UTC), RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug)]
enum Command {
    Stats,
    Recent { limit: usize },
    Submit(SubmissionDraft),
    Import(ExternalStats),
    Export(ExportFormat),
    Reset,
    Seed,
}

struct Args {
    db_path: PathBuf,
    utc_days: bool,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_path = std::env::var("PROGRESS_DB_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("progress.sqlite3"), PathBuf::from);
        let utc_days = std::env::var("PROGRESS_UTC").is_ok_and(|value| value == "1");

        let name = loop {
            let Some(arg) = args.next() else {
                return Ok(None);
            };
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbPath { raw: value });
                    }
                    db_path = PathBuf::from(value);
                }
                "--help" | "-h" => return Ok(None),
                _ => break arg,
            }
        };

        let command = match name.as_str() {
            "stats" => Command::Stats,
            "recent" => Self::parse_recent(&mut args)?,
            "submit" => Self::parse_submit(&mut args)?,
            "import" => {
                let payload = require_value(&mut args, "import")?;
                let stats = serde_json::from_str(&payload)
                    .map_err(|err| ArgsError::InvalidImport(err.to_string()))?;
                Command::Import(stats)
            }
            "export" => Self::parse_export(&mut args)?,
            "reset" => Command::Reset,
            "seed" => Command::Seed,
            _ => return Err(ArgsError::UnknownArg(name)),
        };

        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_path,
            utc_days,
            command,
        }))
    }

    fn parse_recent(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
        let mut limit = DEFAULT_RECENT_LIMIT;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--limit" => limit = parse_number(require_value(args, "--limit")?, "--limit")?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Command::Recent { limit })
    }

    fn parse_submit(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
        let mut title = None;
        let mut score = None;
        let mut correct = None;
        let mut total = None;
        let mut quiz_id = None;
        let mut time_spent = 0.0;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--title" => title = Some(require_value(args, "--title")?),
                "--quiz-id" => quiz_id = Some(require_value(args, "--quiz-id")?),
                "--score" => score = Some(parse_number(require_value(args, "--score")?, "--score")?),
                "--correct" => {
                    correct = Some(parse_number(require_value(args, "--correct")?, "--correct")?);
                }
                "--total" => total = Some(parse_number(require_value(args, "--total")?, "--total")?),
                "--time" => time_spent = parse_number(require_value(args, "--time")?, "--time")?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let title: String = title.ok_or(ArgsError::MissingOption { flag: "--title" })?;
        let score: f64 = score.ok_or(ArgsError::MissingOption { flag: "--score" })?;
        let correct = correct.ok_or(ArgsError::MissingOption { flag: "--correct" })?;
        let total = total.ok_or(ArgsError::MissingOption { flag: "--total" })?;
        let quiz_id = quiz_id.unwrap_or_else(|| slug(&title));

        Ok(Command::Submit(
            SubmissionDraft::new(quiz_id, title, score)
                .with_answers(correct, total)
                .with_time_spent(time_spent),
        ))
    }

    fn parse_export(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
        let mut format = ExportFormat::Json;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--format" => {
                    let value = require_value(args, "--format")?;
                    format = match value.as_str() {
                        "json" => ExportFormat::Json,
                        "csv" => ExportFormat::Csv,
                        _ => return Err(ArgsError::InvalidFormat { raw: value }),
                    };
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Command::Export(format))
    }
}

fn slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Demo activity recorded by `seed`: (title, score, correct, total, minutes).
const DEMO_ACTIVITY: [(&str, f64, u32, u32, f64); 5] = [
    ("Reading Comprehension", 88.0, 22, 25, 22.0),
    ("Speaking Exercise", 92.0, 23, 25, 18.0),
    ("Listening Practice", 78.0, 18, 23, 25.0),
    ("Vocabulary Builder", 85.0, 17, 20, 20.0),
    ("Basic Grammar", 90.0, 18, 20, 15.0),
];

/// Record the demo activity on consecutive days ending today.
fn seed(services: &AppServices, now: DateTime<Utc>) -> Result<(), Box<dyn std::error::Error>> {
    let days = i64::try_from(DEMO_ACTIVITY.len())?;
    for (offset, (title, score, correct, total, minutes)) in (1..=days).rev().zip(DEMO_ACTIVITY) {
        let store = services.progress_at(Clock::fixed(now - Duration::days(offset - 1)));
        let draft = SubmissionDraft::new(slug(title), title, score)
            .with_answers(correct, total)
            .with_time_spent(minutes * 60.0);
        store.try_save_submission(draft)?;
    }
    info!("Seeded {} demo submissions", DEMO_ACTIVITY.len());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let zone = if args.utc_days {
        CalendarZone::utc()
    } else {
        CalendarZone::Local
    };
    let config = ProgressStoreConfig::default().with_calendar_zone(zone);
    let clock = Clock::default_clock();
    let app_services = AppServices::new_sqlite(&args.db_path, clock, config)?;
    let progress = app_services.progress();

    match args.command {
        Command::Stats => print_json(&progress.get_statistics()),
        Command::Recent { limit } => print_json(&progress.get_recent_submissions(limit)),
        Command::Submit(draft) => {
            let submission = progress.try_save_submission(draft)?;
            print_json(&submission)
        }
        Command::Import(stats) => print_json(&progress.import_progress(&stats)),
        Command::Export(ExportFormat::Json) => {
            let json = progress
                .export_json()
                .ok_or("failed to encode progress export")?;
            println!("{json}");
            Ok(())
        }
        Command::Export(ExportFormat::Csv) => {
            print!("{}", progress.export_csv());
            Ok(())
        }
        Command::Reset => print_json(&progress.reset_progress()),
        Command::Seed => {
            seed(&app_services, clock.now())?;
            print_json(&progress.get_statistics())
        }
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
