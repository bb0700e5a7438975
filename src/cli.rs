//! Command-line and environment front end for [`Config`].
//!
//! Every flag can also be supplied through the environment variable named
//! next to it; a `.env` file in the working directory is honored by the
//! binary before parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "chatvisor",
    about = "Resilient client for a line-oriented chat server",
    version
)]
pub struct Cli {
    #[arg(long, env = "HOST", default_value = "minechat.dvmn.org", help = "Chat server hostname")]
    pub host: String,

    #[arg(
        long = "read-port",
        visible_alias = "iport",
        env = "READER_PORT",
        default_value_t = 5000,
        help = "Port of the read-only feed"
    )]
    pub read_port: u16,

    #[arg(
        long = "write-port",
        visible_alias = "oport",
        env = "WRITER_PORT",
        default_value_t = 5050,
        help = "Port of the write channel"
    )]
    pub write_port: u16,

    #[arg(
        long = "history",
        value_name = "PATH",
        env = "HISTORY_FILE",
        default_value = "history.txt",
        help = "File that received messages are appended to"
    )]
    pub history: PathBuf,

    #[arg(long, help = "Do not persist or replay history")]
    pub no_history: bool,

    #[arg(long, env = "TOKEN", hide_env_values = true, help = "Token of a registered account")]
    pub token: Option<String>,

    #[arg(long, env = "NICKNAME", help = "Nickname to register with when no token is given")]
    pub nickname: Option<String>,

    #[arg(long, env = "DEBUG", help = "Enable debug logging")]
    pub debug: bool,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Send this single message and exit instead of running interactively"
    )]
    pub message: Option<String>,
}

impl Cli {
    /// Builds and validates the engine configuration.
    ///
    /// A one-shot `--message` without a token also needs `--nickname`, since
    /// there is no interactive input to take it from.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let one_shot = self.message.is_some();
        let cfg = Config {
            host: self.host,
            read_port: self.read_port,
            write_port: self.write_port,
            token: self.token.filter(|t| !t.is_empty()),
            nickname: self.nickname.filter(|n| !n.trim().is_empty()),
            history_path: (!self.no_history).then_some(self.history),
            debug: self.debug,
            ..Config::default()
        };
        cfg.validate()?;
        if one_shot && cfg.token.is_none() && cfg.nickname.is_none() {
            return Err(ConfigError::NicknameRequired);
        }
        Ok(cfg)
    }
}
