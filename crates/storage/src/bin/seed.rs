use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use exam_core::model::{AttemptId, ExamResult, Question, QuestionDraft};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    record: String,
    attempts: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidAttempts { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidAttempts { raw } => write!(f, "invalid --attempts value: {raw}"),
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
            std::env::var("EXAM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut record = std::env::var("EXAM_RECORD").unwrap_or_else(|_| "exam-history".into());
        let mut attempts = std::env::var("EXAM_ATTEMPTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
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
                "--record" => {
                    record = require_value(&mut args, "--record")?;
                }
                "--attempts" => {
                    let value = require_value(&mut args, "--attempts")?;
                    attempts = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidAttempts { raw: value.clone() })?;
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
            record,
            attempts,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --record <name>       History record name (default: exam-history)");
    eprintln!("  --attempts <n>        Number of demo attempts to seed (default: 5)");
    eprintln!("  --now <rfc3339>       Fixed current time for deterministic seeding");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  EXAM_DB_URL, EXAM_RECORD, EXAM_ATTEMPTS");
}

fn sample_questions() -> Vec<Question> {
    let samples = [
        ("What is the first step of risk treatment?", 1),
        ("Which annex lists the security controls?", 0),
        ("What does the ISMS scope statement define?", 2),
        ("How often must the internal audit run?", 1),
        ("Who approves the information security policy?", 0),
    ];
    samples
        .iter()
        .map(|(text, correct)| {
            QuestionDraft::new(
                *text,
                vec!["Option A".into(), "Option B".into(), "Option C".into()],
                *correct,
            )
            .validate()
            .expect("sample questions are valid")
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let questions = sample_questions();

    // Oldest attempt first, scores drifting upward so the analytics trend
    // has something to show.
    let mut history = Vec::with_capacity(args.attempts as usize);
    for i in 0..args.attempts {
        let correct = ((i as usize) + 1).min(questions.len());
        let answers: HashMap<usize, usize> = (0..correct)
            .map(|position| (position, questions[position].correct_index()))
            .collect();

        let days_ago = i64::from(args.attempts - i) * 2;
        let started_at = now - Duration::days(days_ago);
        let completed_at = started_at + Duration::minutes(35) + Duration::minutes(i64::from(i));

        let result = ExamResult::new(
            AttemptId::new(),
            questions.clone(),
            answers,
            started_at,
            completed_at,
            false,
        )?;
        history.push(result);
    }

    storage.history.save_history(&args.record, &history).await?;

    println!(
        "Seeded {} attempts into record '{}' of {}",
        history.len(),
        args.record,
        args.db_url
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
