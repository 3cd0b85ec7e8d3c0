//! CLI - Command Line Interface for StreamFront
//!
//! Drives the network core from a terminal: fetch component data, detail
//! pages, probe connectivity, and exercise the playback calls.
//! All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Fetch a listing component
//! streamfront component '{"type":"LISTING","params":{"genre":"action"}}' --page 2
//!
//! # Descriptor from a file, cached forever
//! streamfront component @rail.json --ttl forever
//!
//! # Detail page and health probe
//! streamfront details 8f2c movie
//! streamfront health
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::api::ErrorKind;
use crate::cache::CacheTtl;
use crate::models::{ComponentDescriptor, Project};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error or backend unreachable
    NetworkError = 3,
    /// Session rejected
    Unauthorized = 4,
    /// Nothing found
    NoContent = 5,
}

impl ExitCode {
    /// Exit code for a failed fetch
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NetworkDown | ErrorKind::Cancelled => ExitCode::NetworkError,
            ErrorKind::Unauthorized => ExitCode::Unauthorized,
            ErrorKind::NotFoundOrTransient => ExitCode::NoContent,
            ErrorKind::GenericApiError => ExitCode::Error,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// StreamFront - storefront network core
#[derive(Parser, Debug)]
#[command(
    name = "streamfront",
    version,
    about = "Storefront network core: cached content fetching and session calls",
    after_help = "EXAMPLES:\n\
                  streamfront component @rail.json          Fetch a component\n\
                  streamfront details 8f2c movie            Fetch a detail page\n\
                  streamfront health                        Probe the backend"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the project
    #[arg(long, global = true, value_parser = parse_project)]
    pub project: Option<Project>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch data for a UI component descriptor
    Component(ComponentCmd),
    /// Fetch a detail entity
    Details(DetailsCmd),
    /// Probe backend connectivity
    Health(HealthCmd),
    /// Report playback progress
    Progress(ProgressCmd),
    /// Add or remove a favourite
    Favourite(FavouriteCmd),
    /// List recently watched items
    Recent(RecentCmd),
    /// Verify the active profile's parental PIN
    Pin(PinCmd),
}

// =============================================================================
// Command Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct ComponentCmd {
    /// Descriptor JSON, or @path to a JSON file
    pub descriptor: String,

    /// Cache TTL: seconds, 'off' or 'forever' (default from config)
    #[arg(long, value_parser = parse_ttl)]
    pub ttl: Option<CacheTtl>,

    /// Page number
    #[arg(long, short = 'p')]
    pub page: Option<u32>,

    /// Id of the entity the component is shown for
    #[arg(long)]
    pub initiator_id: Option<String>,

    /// Type of the entity the component is shown for
    #[arg(long)]
    pub initiator_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct DetailsCmd {
    /// Content uid
    pub uid: String,

    /// Content kind (movie, series, episode, live, ...)
    #[arg(default_value = "movie")]
    pub kind: String,

    /// Cache TTL: seconds, 'off' or 'forever'
    #[arg(long, value_parser = parse_ttl)]
    pub ttl: Option<CacheTtl>,
}

#[derive(Args, Debug)]
pub struct HealthCmd {}

#[derive(Args, Debug)]
pub struct ProgressCmd {
    /// Content uid
    pub uid: String,

    /// Position in seconds
    pub position: u64,

    /// Total duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FavouriteAction {
    Add,
    Remove,
}

#[derive(Args, Debug)]
pub struct FavouriteCmd {
    #[arg(value_enum)]
    pub action: FavouriteAction,

    /// Content uid
    pub uid: String,
}

#[derive(Args, Debug)]
pub struct RecentCmd {
    /// Page number
    #[arg(long, short = 'p', default_value_t = 0)]
    pub page: u32,
}

#[derive(Args, Debug)]
pub struct PinCmd {
    /// PIN to verify
    pub pin: String,
}

fn parse_ttl(s: &str) -> Result<CacheTtl, String> {
    s.parse()
}

fn parse_project(s: &str) -> Result<Project, String> {
    s.parse()
}

/// Descriptor from inline JSON or `@path`
pub fn read_descriptor(input: &str) -> Result<ComponentDescriptor> {
    let text = match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor file {}", path))?,
        None => input.to_string(),
    };
    serde_json::from_str(&text).context("Invalid component descriptor")
}

/// PIN sanity check before hitting the backend
pub fn validate_pin(pin: &str) -> Result<&str, &'static str> {
    if (4..=8).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(pin)
    } else {
        Err("Invalid PIN format (expected 4-8 digits)")
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Health probe response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub online: bool,
    pub base_url: String,
}

/// Status OK response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
