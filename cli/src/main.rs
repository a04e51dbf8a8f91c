//! `focus`: run the focus API operations from a shell.
//!
//! Prints the raw response body to stdout. Only transport failures are
//! treated as errors; a 4xx body is printed like any other.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use focus_core::{ApiError, ClientConfig, FocusApi, FocusSessionStatus, FocusViolationType};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Talk to the study-companion focus session API")]
#[command(version)]
struct Cli {
    /// Base URL of the API server [default: $FOCUS_API_BASE_URL or http://localhost:3000]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Overall request timeout in seconds [default: $FOCUS_API_TIMEOUT_SECS]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Auth {
    /// Bearer token from `focus token`
    #[arg(long, env = "FOCUS_API_TOKEN")]
    token: String,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange email and password for a bearer token
    Token {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FOCUS_API_PASSWORD")]
        password: String,
    },
    /// Start a focus session for a lesson/quiz pair
    Start {
        #[command(flatten)]
        auth: Auth,
        #[arg(long)]
        lesson_id: i64,
        #[arg(long, default_value_t = 0)]
        quiz_id: i64,
        #[arg(long, default_value_t = 1200)]
        duration_seconds: i64,
    },
    /// Report a focus event within a session
    Event {
        #[command(flatten)]
        auth: Auth,
        #[arg(long)]
        session_id: i64,
        /// Event type, e.g. WINDOW_BLUR (sent as given)
        #[arg(long = "type", default_value = FocusViolationType::VisibilityChange.as_str())]
        kind: String,
        #[arg(long, default_value_t = 1)]
        severity: i64,
        #[arg(long, default_value = "")]
        details: String,
    },
    /// End a focus session
    End {
        #[command(flatten)]
        auth: Auth,
        #[arg(long)]
        session_id: i64,
        /// Final status, e.g. COMPLETED (sent as given)
        #[arg(long, default_value = FocusSessionStatus::Completed.as_str())]
        status: String,
    },
}

impl Cli {
    /// Flags override whatever `base` (normally the environment) provides.
    fn config(&self, base: ClientConfig) -> ClientConfig {
        let mut config = base;
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config.base_url = url.to_string();
        }
        match self.timeout_secs {
            Some(0) => config.timeout = None,
            Some(secs) => config.timeout = Some(Duration::from_secs(secs)),
            None => {}
        }
        config
    }
}

fn run(cli: Cli, base: ClientConfig) -> Result<String, ApiError> {
    let api = FocusApi::new(&cli.config(base));
    match cli.command {
        Command::Token { email, password } => api.request_token(&email, &password),
        Command::Start {
            auth,
            lesson_id,
            quiz_id,
            duration_seconds,
        } => api.start_focus_session(&auth.token, lesson_id, quiz_id, duration_seconds),
        Command::Event {
            auth,
            session_id,
            kind,
            severity,
            details,
        } => api.push_focus_event(&auth.token, session_id, &kind, severity, &details),
        Command::End {
            auth,
            session_id,
            status,
        } => api.end_focus_session(&auth.token, session_id, &status),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse(), ClientConfig::from_env()) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
