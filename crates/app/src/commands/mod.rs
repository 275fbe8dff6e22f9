//! Command-line surface

mod auth;
mod remote;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use classmatch_api::Filters;
use classmatch_core::SessionPhase;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "classmatch", version, about = "Find classmates to study with")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show who is logged in
    Status,
    /// Log in with a local account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLASSMATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a local account and log into it
    Signup(SignupArgs),
    /// End the local session
    Logout,
    /// Show the logged-in user's profile
    Profile,
    /// Edit the logged-in user's profile
    UpdateProfile(ProfileArgs),
    /// List courses from the backend
    Courses(FilterArgs),
    /// List matched students from the backend
    Matches(FilterArgs),
    /// List study groups from the backend
    Groups(FilterArgs),
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "CLASSMATCH_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub major: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
}

#[derive(Debug, Args, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub avatar: Option<String>,
    #[arg(long)]
    pub major: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    /// Replace enrolled courses (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub courses: Option<Vec<String>>,
    /// Preferred study times (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub times: Option<Vec<String>>,
    /// Preferred study locations (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub locations: Option<Vec<String>>,
    #[arg(long)]
    pub style: Option<String>,
}

#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Query filter as key=value; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

impl FilterArgs {
    fn into_filters(self) -> Filters {
        self.filters.into_iter().collect()
    }
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Execute one command against an initialized state, returning text to print
pub async fn run(command: Command, state: &AppState) -> Result<String> {
    if state.auth.phase() == SessionPhase::Pending {
        // Restore failures leave the session logged out
        if let Err(e) = state.auth.restore_session().await {
            warn!(error = %e, "Could not restore session");
        }
    }

    match command {
        Command::Status => Ok(auth::status(state)),
        Command::Login { email, password } => auth::login(state, &email, &password),
        Command::Signup(args) => auth::signup(state, args),
        Command::Logout => auth::logout(state),
        Command::Profile => auth::profile(state).await,
        Command::UpdateProfile(args) => auth::update_profile(state, args).await,
        Command::Courses(args) => remote::courses(state, args.into_filters()).await,
        Command::Matches(args) => remote::matches(state, args.into_filters()).await,
        Command::Groups(args) => remote::groups(state, args.into_filters()).await,
    }
}

pub(crate) fn argument_error(message: impl Into<String>) -> AppError {
    AppError::Argument(message.into())
}
