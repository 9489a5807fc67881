use aisuite_session::auth::{GuardDecision, RedirectOutcome};
use aisuite_session::navigation::{History, MemoryHistory};
use aisuite_session::notifications::{LogNotifier, NoticeLog, Notifier};
use aisuite_session::{AuthRuntime, AuthState, ClientConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "aisuite-session", about = "AI Business Suite session client")]
struct Cli {
    /// TOML configuration file; AISUITE_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the identity provider login URL
    LoginUrl,
    /// Exchange the session token in a provider redirect URL
    Exchange {
        /// Full redirect location, e.g. http://localhost:3000/#session_id=...
        redirect_url: String,
    },
    /// Show the current identity
    Whoami,
    /// Show the route guard decision for a path
    Guard { path: String },
    /// Invalidate the session
    Logout,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

/// Notices go to the log and are kept for the command's summary
struct TeeNotifier {
    log: LogNotifier,
    record: NoticeLog,
}

impl Notifier for TeeNotifier {
    fn notify(&self, notice: aisuite_session::notifications::Notice) {
        self.log.notify(notice.clone());
        self.record.notify(notice);
    }
}

fn print_state(state: &AuthState) {
    match state {
        AuthState::Authenticated(identity) => println!(
            "authenticated: {} <{}> ({})",
            identity.name, identity.email, identity.id
        ),
        other => println!("{}", other.label()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = ClientConfig::load(cli.config.as_deref())?;

    let start = match &cli.command {
        Command::Exchange { redirect_url } => redirect_url.clone(),
        _ => format!(
            "{}{}",
            config.app_origin.trim_end_matches('/'),
            config.entry_route
        ),
    };
    let history = Arc::new(MemoryHistory::parse(&start)?);
    let notifier = Arc::new(TeeNotifier {
        log: LogNotifier,
        record: NoticeLog::new(),
    });

    let runtime = AuthRuntime::new(config, history.clone(), notifier.clone())?;

    match cli.command {
        Command::LoginUrl => {
            println!("{}", runtime.login_url()?);
        }
        Command::Exchange { .. } => {
            match runtime.handle_redirect().await {
                RedirectOutcome::NoToken => println!("no session_id in redirect URL"),
                RedirectOutcome::Exchanged(outcome) => println!("exchange: {:?}", outcome),
            }
            for message in notifier.record.messages() {
                println!("notice: {}", message);
            }
            println!("location: {}", history.current());
            print_state(&runtime.cache().state());
        }
        Command::Whoami => {
            let state = runtime.bootstrap().await;
            print_state(&state);
        }
        Command::Guard { path } => {
            runtime.bootstrap().await;
            match runtime.resolve_route(&path).await {
                GuardDecision::Render(route) => println!("render {:?}", route),
                GuardDecision::Redirect(to) => println!("redirect {} -> {}", path, to),
                GuardDecision::NotFound => println!("not found: {}", path),
                GuardDecision::Wait => println!("waiting for identity check"),
            }
        }
        Command::Logout => {
            runtime.logout().await;
            print_state(&runtime.cache().state());
        }
    }

    runtime.shutdown();
    Ok(())
}
