//! autodocops - inspect and drive the AutoDocOps client state from a terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use autodocops_core::config::{ENV_DATA_DIR, ENV_STORAGE};
use autodocops_core::{AppContext, Session, StorageConfig, StorageMode, Theme, UiPreferences};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "autodocops", version, about = "AutoDocOps client state")]
struct Cli {
    /// Storage medium: secure, plain or browser (defaults to AUTODOCOPS_STORAGE, then secure)
    #[arg(long)]
    storage: Option<StorageMode>,

    /// Data directory (defaults to AUTODOCOPS_DATA_DIR, then ~/.config/autodocops)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login { email: String, password: String },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Print the Authorization header for API calls
    Token,
    /// Set the theme (light, dark or system)
    Theme { theme: Theme },
    /// Turn notifications on or off
    Notifications {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Show UI preferences
    Prefs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    On,
    Off,
}

/// Environment config with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<StorageConfig, String> {
    resolve_config_with(cli, |name| std::env::var(name).ok())
}

/// Flags replace the matching variables before they are read, so a bad
/// value in an overridden variable is never parsed.
fn resolve_config_with<F>(cli: &Cli, env: F) -> Result<StorageConfig, String>
where
    F: Fn(&str) -> Option<String>,
{
    StorageConfig::from_lookup(|name| match name {
        ENV_STORAGE if cli.storage.is_some() => cli.storage.map(|mode| mode.to_string()),
        ENV_DATA_DIR if cli.data_dir.is_some() => {
            cli.data_dir.as_ref().map(|dir| dir.display().to_string())
        }
        _ => env(name),
    })
    .map_err(|e| e.to_string())
}

fn describe_session(session: &Session) -> String {
    match (&session.user, session.is_authenticated) {
        (Some(user), true) => format!("{} <{}> (id {})", user.name, user.email, user.id),
        (Some(user), false) => format!("{} <{}> (not authenticated)", user.name, user.email),
        (None, _) => "Not signed in".to_string(),
    }
}

fn describe_prefs(prefs: &UiPreferences) -> String {
    format!(
        "theme: {}\nnotifications: {}",
        prefs.theme,
        if prefs.notifications { "on" } else { "off" }
    )
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli)?;
    let ctx = AppContext::builder()
        .config(config)
        .build()
        .await
        .map_err(|e| e.to_string())?;

    let result = execute(&ctx, cli.command).await;
    ctx.shutdown().await;
    result
}

async fn execute(ctx: &AppContext, command: Command) -> Result<(), String> {
    match command {
        Command::Login { email, password } => {
            ctx.session
                .login(&email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("Signed in as {}", describe_session(&ctx.session.snapshot()));
        }
        Command::Logout => {
            ctx.session.logout();
            println!("Signed out");
        }
        Command::Whoami => {
            println!("{}", describe_session(&ctx.session.snapshot()));
        }
        Command::Token => match ctx.session.authorization_header() {
            Some(header) => println!("Authorization: {header}"),
            None => return Err("No token stored".to_string()),
        },
        Command::Theme { theme } => {
            ctx.preferences.set_theme(theme);
            println!("{}", describe_prefs(&ctx.preferences.snapshot()));
        }
        Command::Notifications { state } => {
            ctx.preferences.set_notifications(state == Toggle::On);
            println!("{}", describe_prefs(&ctx.preferences.snapshot()));
        }
        Command::Prefs => {
            println!("{}", describe_prefs(&ctx.preferences.snapshot()));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
