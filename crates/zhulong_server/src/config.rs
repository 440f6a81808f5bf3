//! Server configuration from flags, environment and `.env`.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use zhulong_core::{RankingSettings, ReminderSettings};

const DEFAULT_INTEREST_KEYWORDS: &str =
    "科技创业,企业管理,人工智能,佛教,修行,商业,视讯,智慧教育,创业";

/// Runtime settings for the HTTP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "zhulong", author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "ZHULONG_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file. Created and migrated on first use.
    #[arg(long, env = "ZHULONG_DB_PATH", default_value = "zhulong.db")]
    pub db_path: PathBuf,

    /// Directory for rolling log files. Relative paths resolve against the
    /// working directory.
    #[arg(long, env = "ZHULONG_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// trace | debug | info | warn | error. Defaults by build mode.
    #[arg(long, env = "ZHULONG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Look-ahead for upcoming reminders.
    #[arg(long, env = "ZHULONG_REMINDER_WINDOW_HOURS", default_value_t = 24)]
    pub reminder_window_hours: u64,

    /// Number of contents `GET /api/contents` returns by default.
    #[arg(long, env = "ZHULONG_DAILY_PUSH_COUNT", default_value_t = 10)]
    pub daily_push_count: u32,

    /// Comma-separated interest keywords used for relevance ranking.
    #[arg(
        long,
        env = "ZHULONG_INTEREST_KEYWORDS",
        value_delimiter = ',',
        default_value = DEFAULT_INTEREST_KEYWORDS
    )]
    pub interest_keywords: Vec<String>,

    #[arg(long, env = "ZHULONG_USER_IDENTITY", default_value = "")]
    pub user_identity: String,

    #[arg(long, env = "ZHULONG_USER_TRANSCENDENT", default_value = "")]
    pub user_transcendent: String,

    #[arg(long, env = "ZHULONG_USER_WORLDLY", default_value = "")]
    pub user_worldly: String,
}

impl ServerConfig {
    pub fn ranking(&self) -> RankingSettings {
        RankingSettings::new(
            self.interest_keywords
                .iter()
                .map(|keyword| keyword.trim())
                .filter(|keyword| !keyword.is_empty()),
        )
    }

    pub fn reminders(&self) -> ReminderSettings {
        ReminderSettings {
            window: hours(self.reminder_window_hours),
        }
    }

    /// Absolute log directory, as the logger requires.
    pub fn absolute_log_dir(&self) -> std::io::Result<PathBuf> {
        if self.log_dir.is_absolute() {
            return Ok(self.log_dir.clone());
        }
        Ok(std::env::current_dir()?.join(&self.log_dir))
    }
}

pub(crate) fn hours(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60 * 60))
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = ServerConfig::try_parse_from(["zhulong"]).unwrap();
        assert_eq!(config.daily_push_count, 10);
        assert_eq!(config.reminders().window, Duration::from_secs(24 * 60 * 60));
        assert!(config
            .ranking()
            .interest_keywords
            .contains(&"人工智能".to_string()));
    }

    #[test]
    fn keywords_split_on_commas_and_drop_blanks() {
        let config = ServerConfig::try_parse_from([
            "zhulong",
            "--interest-keywords",
            "rust, ai,,sqlite",
            "--reminder-window-hours",
            "2",
        ])
        .unwrap();
        assert_eq!(
            config.ranking().interest_keywords,
            vec!["rust".to_string(), "ai".to_string(), "sqlite".to_string()]
        );
        assert_eq!(config.reminders().window, Duration::from_secs(2 * 60 * 60));
    }
}
