use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spacegate_cli::{GatewayClient, TerminalNavigator, TerminalNotifier};
use spacegate_core::config::Config;
use spacegate_core::form::{CreateSpaceFlow, CreateSpaceForm, SubmitOutcome};
use spacegate_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "spacegate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the SpaceGate API
    #[arg(long, env = "SPACEGATE_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// TOML configuration file
    #[arg(short, long, env = "SPACEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Session token from `login` or `signup`
    #[arg(long, env = "SPACEGATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a user and print a session token
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "SPACEGATE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and print a session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "SPACEGATE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user
    Whoami,

    /// Create a Space with yourself as its admin
    CreateSpace {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        /// How long the success message stays up before redirecting,
        /// overriding `form.redirect_delay`
        #[arg(long)]
        redirect_delay_ms: Option<u64>,
    },

    /// Show a Space you belong to
    ShowSpace {
        #[arg(long)]
        slug: String,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Command::CreateSpace {
        redirect_delay_ms: Some(ms),
        ..
    } = &args.command
    {
        config.form.redirect_delay = Duration::from_millis(*ms);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let log_level = args.log_level.parse::<LogLevel>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'warn'", args.log_level);
        LogLevel::Warn
    });
    init_logging_with_config(LogConfig::new(log_level).json_format(args.json_logs))?;

    let client = GatewayClient::new(args.server.clone(), args.token.clone())?;
    debug!(server = %client.base_url(), "client ready");

    match args.command {
        Command::Signup { username, password } => {
            let session = client.signup(&username, &password).await?;
            info!(user_id = %session.user.id, "signed up");
            println!("{}", session.token);
        }
        Command::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            info!(user_id = %session.user.id, "logged in");
            println!("{}", session.token);
        }
        Command::Whoami => {
            let session = client.session().await?;
            println!("{} ({})", session.user.username, session.user.id);
        }
        Command::CreateSpace { name, slug, .. } => {
            let session = client
                .session()
                .await
                .context("a valid session is required to create a Space")?;

            let mut form = CreateSpaceForm::new();
            form.set_name(name)?;
            form.set_slug(slug)?;
            form.validate()?;

            let navigator = Arc::new(TerminalNavigator::new(client.base_url()));
            let flow = CreateSpaceFlow::new(
                Arc::new(client.clone()),
                Arc::new(TerminalNotifier),
                navigator,
            )
            .with_config(&config.form);

            match flow.submit(&mut form, &session.user_id()).await? {
                SubmitOutcome::Created(space) => debug!(space_id = %space.id, "done"),
                SubmitOutcome::Failed(err) => bail!(err),
            }
        }
        Command::ShowSpace { slug } => {
            let space = client.find_space_by_slug(&slug).await?;
            println!("{}", serde_json::to_string_pretty(&space)?);
        }
    }

    Ok(())
}
