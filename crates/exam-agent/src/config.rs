//! Startup options of the exam agent.

use crate::auth::AllowList;
use crate::error::ConfigError;
use clap::Parser;
use std::net::SocketAddr;
use tracing::warn;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Exam agent - HTTP front-end for CrownLabs exam instances
#[derive(Parser, Debug, Clone)]
#[command(name = "exam-agent")]
#[command(about = "HTTP front-end for CrownLabs exam instances")]
#[command(version)]
pub struct Options {
    /// [address]:port of the landing server
    #[arg(long = "address", env = "EXAM_AGENT_ADDRESS", default_value = ":8888")]
    pub listener_addr: String,

    /// Namespace of CrownLabs Templates that will be listed
    #[arg(
        long = "templates-namespace",
        env = "EXAM_AGENT_TEMPLATES_NAMESPACE",
        default_value = "workspace-exams"
    )]
    pub templates_ns: String,

    /// Comma separated list of IPs that are allowed to create new instances
    #[arg(long = "allowed-ips", env = "EXAM_AGENT_ALLOWED_IPS", default_value = "")]
    pub allowed_ips: String,

    /// Log output format
    #[arg(long, env = "EXAM_AGENT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Options {
    /// Performs general flags validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates_ns.is_empty() {
            return Err(ConfigError::MissingArgument("templates-namespace"));
        }

        self.socket_addr()?;

        if self.allowed_ips.is_empty() {
            warn!("No whitelist IPs have been specified: all IPs are allowed");
        }

        Ok(())
    }

    /// Resolves the listener address; `:port` binds every interface.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = if self.listener_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listener_addr)
        } else {
            self.listener_addr.clone()
        };

        addr.parse().map_err(|source| ConfigError::InvalidAddress {
            addr: self.listener_addr.clone(),
            source,
        })
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::parse(&self.allowed_ips)
    }
}
