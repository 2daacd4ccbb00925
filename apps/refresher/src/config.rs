use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{FixedOffset, NaiveTime};

const DEFAULT_LOGIN_URL: &str = "https://www.naukri.com/central-login-services/v1/login";
const DEFAULT_UPLOAD_URL: &str = "https://filevalidation.naukri.com/file";
const DEFAULT_PROFILE_BASE_URL: &str =
    "https://www.naukri.com/cloudgateway-mynaukri/resman-aggregator-services/v0/users/self/profiles";
const DEFAULT_SCHEDULE: &str = "08:00,08:30,08:45,09:00";
/// India Standard Time. No daylight saving, so a fixed offset is exact.
const DEFAULT_UTC_OFFSET: &str = "+05:30";

/// Application configuration loaded from environment variables.
/// Fails at startup if the portal correlation keys or profile id are missing.
///
/// The account credentials are allowed to be empty here: the login step
/// rejects them so that a misconfigured deployment still serves `/` and
/// reports the problem on every run.
#[derive(Debug, Clone)]
pub struct Config {
    pub resume_path: PathBuf,
    pub log_file_path: PathBuf,
    pub email: String,
    pub password: String,
    pub profile_id: String,
    pub form_key: String,
    pub file_key: String,
    pub login_url: String,
    pub upload_url: String,
    pub profile_base_url: String,
    /// Use the configured `file_key` when the upload response carries no reference.
    pub allow_file_key_fallback: bool,
    pub http_timeout_secs: u64,
    pub schedule_times: Vec<NaiveTime>,
    pub schedule_utc_offset: FixedOffset,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            resume_path: PathBuf::from(env_or("RESUME_PATH", "resume.docx")),
            log_file_path: PathBuf::from(env_or("LOG_FILE_PATH", "naukri_update.log")),
            email: env_or("NAUKRI_EMAIL", ""),
            password: env_or("NAUKRI_PASSWORD", ""),
            profile_id: require_non_empty("NAUKRI_PROFILE_ID")?,
            form_key: require_non_empty("NAUKRI_FORM_KEY")?,
            file_key: require_non_empty("NAUKRI_FILE_KEY")?,
            login_url: env_or("NAUKRI_LOGIN_URL", DEFAULT_LOGIN_URL),
            upload_url: env_or("NAUKRI_UPLOAD_URL", DEFAULT_UPLOAD_URL),
            profile_base_url: env_or("NAUKRI_PROFILE_BASE_URL", DEFAULT_PROFILE_BASE_URL),
            allow_file_key_fallback: parse_bool(&env_or("NAUKRI_ALLOW_FILE_KEY_FALLBACK", "false"))
                .context("NAUKRI_ALLOW_FILE_KEY_FALLBACK must be true or false")?,
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            schedule_times: parse_schedule_times(&env_or("SCHEDULE_TIMES", DEFAULT_SCHEDULE))
                .context("SCHEDULE_TIMES must be a comma-separated list of HH:MM")?,
            schedule_utc_offset: parse_utc_offset(&env_or("SCHEDULE_UTC_OFFSET", DEFAULT_UTC_OFFSET))
                .context("SCHEDULE_UTC_OFFSET must look like +05:30")?,
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Full URL of the profile resume endpoint for the configured profile.
    pub fn profile_resume_url(&self) -> String {
        format!(
            "{}/{}/advResume",
            self.profile_base_url.trim_end_matches('/'),
            self.profile_id
        )
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Like `require_env`, but a blank value counts as missing.
fn require_non_empty(key: &str) -> Result<String> {
    let value = require_env(key)?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value.trim().to_string())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("unrecognised boolean '{other}'"),
    }
}

/// Parses `"08:00,08:30"` into sorted, de-duplicated wall-clock times.
pub fn parse_schedule_times(raw: &str) -> Result<Vec<NaiveTime>> {
    let mut times = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M").with_context(|| format!("invalid time '{s}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    if times.is_empty() {
        bail!("at least one schedule time is required");
    }

    times.sort();
    times.dedup();
    Ok(times)
}

/// Parses `"+05:30"` / `"-04:00"` / `"Z"` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("zero offset rejected"));
    }

    let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = raw.strip_prefix('-') {
        (-1, rest)
    } else {
        bail!("offset '{raw}' must start with + or -");
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("offset '{raw}' must be ±HH:MM"))?;
    let hours: i32 = hours.parse().with_context(|| format!("bad hours in '{raw}'"))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("bad minutes in '{raw}'"))?;
    if hours > 14 || minutes > 59 {
        bail!("offset '{raw}' is out of range");
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("offset '{raw}' is out of range"))
}
