use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration, loaded once at startup from the environment.
///
/// Every required value is validated here; the bot refuses to start on a
/// missing token, a missing API key, or a malformed/empty allow-list.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_token: String,
    pub gemini_api_key: String,
    pub authorized_user_ids: Vec<i64>,

    pub gemini_model: String,
    pub gemini_timeout: Duration,

    pub keep_alive_port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_token = env_str("TELEGRAM_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_TOKEN environment variable is required".to_string())
            })?;

        let gemini_api_key = env_str("GEMINI_API_KEY")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("GEMINI_API_KEY environment variable is required".to_string())
            })?;

        let authorized_user_ids =
            parse_authorized_ids(&env_str("AUTHORIZED_USER_IDS").unwrap_or_default())?;

        let gemini_model = env_str("GEMINI_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "gemini-2.5-flash".to_string());
        let gemini_timeout = Duration::from_secs(env_u64("GEMINI_TIMEOUT_SECS").unwrap_or(60));

        let keep_alive_port = env_u16("KEEP_ALIVE_PORT").unwrap_or(8080);

        Ok(Self {
            telegram_token,
            gemini_api_key,
            authorized_user_ids,
            gemini_model,
            gemini_timeout,
            keep_alive_port,
        })
    }
}

/// Parse the comma-separated allow-list.
///
/// Fail-closed: a non-numeric entry or an empty result is a startup error.
/// The bot must never silently run open to everyone.
pub fn parse_authorized_ids(raw: &str) -> Result<Vec<i64>> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part.parse::<i64>().map_err(|_| {
            Error::Config(format!(
                "AUTHORIZED_USER_IDS contains a non-numeric entry: {part:?}"
            ))
        })?;
        out.push(id);
    }

    if out.is_empty() {
        return Err(Error::Config(
            "AUTHORIZED_USER_IDS must list at least one numeric user id".to_string(),
        ));
    }

    Ok(out)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
