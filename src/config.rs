// src/config.rs

use std::{env, path::PathBuf, str::FromStr};

use dotenvy::dotenv;

use crate::scoring::MarkingScheme;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub table_path: PathBuf,
    /// Optional JSON file overriding the default page layout.
    pub layout_file: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub marking: MarkingScheme,
    pub rust_log: String,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            table_path: PathBuf::from("data.csv"),
            layout_file: None,
            fetch_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            marking: MarkingScheme::default(),
            rust_log: "info".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();
        let marking = MarkingScheme {
            per_correct: parsed("PER_CORRECT_MARKS", defaults.marking.per_correct),
            per_wrong: parsed("PER_WRONG_PENALTY", defaults.marking.per_wrong),
            questions_per_subject: parsed(
                "QUESTIONS_PER_SUBJECT",
                defaults.marking.questions_per_subject,
            ),
            total_subjects: parsed("TOTAL_SUBJECTS", defaults.marking.total_subjects),
        };

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            table_path: env::var("TABLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.table_path),
            layout_file: env::var("LAYOUT_FILE").ok().map(PathBuf::from),
            fetch_timeout_secs: parsed("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            marking,
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        }
    }
}

/// Reads `key` as a `T`, panicking on a value that does not parse.
fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number, got {:?}", key, raw)),
        Err(_) => default,
    }
}
