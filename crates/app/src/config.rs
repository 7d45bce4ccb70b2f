use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{
    DEFAULT_TIME_LIMIT_SECS, QuizSettings, QuizSettingsDraft, QuizSettingsError,
};

/// Question counts offered by the start screen.
pub const ALLOWED_COUNTS: [u32; 3] = [5, 10, 15];
pub const DEFAULT_COUNT: u32 = 5;

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingBank,
    UnknownArg(String),
    InvalidCount { raw: String },
    InvalidTimeLimit { raw: String },
    Settings(QuizSettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingBank => write!(f, "no question bank given (--bank or QUIZ_BANK)"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { raw } => {
                write!(f, "invalid --count value: {raw} (expected 5, 10 or 15)")
            }
            ArgsError::InvalidTimeLimit { raw } => write!(f, "invalid --time-limit value: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<QuizSettingsError> for ArgsError {
    fn from(value: QuizSettingsError) -> Self {
        Self::Settings(value)
    }
}

/// Parsed command line, with environment fallbacks already applied.
#[derive(Debug)]
pub struct Args {
    pub bank: PathBuf,
    pub subject: Option<String>,
    pub count: u32,
    pub settings: QuizSettings,
    pub shuffle: bool,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --bank <file.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bank <path>          JSON question bank");
    eprintln!("  --subject <name>       subject to play (default: first in bank)");
    eprintln!("  --count <n>            5, 10 or 15 questions (default: 5)");
    eprintln!("  --time-limit [secs]    per-question countdown (default budget: {DEFAULT_TIME_LIMIT_SECS}s)");
    eprintln!("  --shuffle              shuffle questions");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK, QUIZ_SUBJECT, QUIZ_COUNT, QUIZ_TIME_LIMIT, QUIZ_LOG, QUIZ_LOG_FORMAT");
}

fn require_value(
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_count(raw: &str) -> Result<u32, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| ALLOWED_COUNTS.contains(count))
        .ok_or_else(|| ArgsError::InvalidCount {
            raw: raw.to_string(),
        })
}

fn parse_time_limit(raw: &str) -> Result<u32, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ArgsError::InvalidTimeLimit {
            raw: raw.to_string(),
        })
}

impl Args {
    /// Parse flags, falling back to `QUIZ_*` environment variables.
    ///
    /// Returns `Ok(None)` when `--help` was requested.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags or invalid values.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        Self::parse_with_env(args, |key| std::env::var(key).ok())
    }

    fn parse_with_env(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut bank = env("QUIZ_BANK").map(PathBuf::from);
        let mut subject = env("QUIZ_SUBJECT").filter(|s| !s.trim().is_empty());
        let mut count = match env("QUIZ_COUNT") {
            Some(raw) => parse_count(&raw)?,
            None => DEFAULT_COUNT,
        };
        let mut time_limit = match env("QUIZ_TIME_LIMIT") {
            Some(raw) => Some(parse_time_limit(&raw)?),
            None => None,
        };
        let mut shuffle = false;

        let mut args = args.into_iter().peekable();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => bank = Some(PathBuf::from(require_value(&mut args, "--bank")?)),
                "--subject" => subject = Some(require_value(&mut args, "--subject")?),
                "--count" => count = parse_count(&require_value(&mut args, "--count")?)?,
                "--time-limit" => {
                    // The budget is optional: a bare flag selects the default countdown.
                    let explicit = args.next_if(|next| !next.starts_with("--"));
                    time_limit = Some(match explicit {
                        Some(raw) => parse_time_limit(&raw)?,
                        None => DEFAULT_TIME_LIMIT_SECS,
                    });
                }
                "--shuffle" => shuffle = true,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let bank = bank.ok_or(ArgsError::MissingBank)?;
        let settings = QuizSettingsDraft {
            time_limit_secs: time_limit,
            ..QuizSettingsDraft::default()
        }
        .validate()?;

        Ok(Some(Self {
            bank,
            subject,
            count,
            settings,
            shuffle,
        }))
    }
}
