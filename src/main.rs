//! mem0 CLI - Entry point
//!
//! Usage: mem0 <command> [options]

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mem0_client::cli::{self, Cli, Commands};
use mem0_client::config::Config;
use mem0_client::remote::{CallContext, RemoteMemoryClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        // Local commands; they must work even when the config file is broken
        Commands::Init(args) => {
            init_tracing(cli.debug);
            cli::init::run(args, config_path)
        }
        Commands::Config(args) => {
            init_tracing(cli.debug);
            cli::config::run(args, config_path)
        }
        Commands::PyAdd(args) => {
            let session = Session::open(config_path, cli.timeout, cli.debug)?;
            cli::py_add::run(args, &session.config, &session.ctx).await
        }
        Commands::Add(args) => {
            let session = Session::open(config_path, cli.timeout, cli.debug)?;
            cli::add::run(args, &session.client()?, &session.ctx, session.default_user()).await
        }
        Commands::List(args) => {
            let session = Session::open(config_path, cli.timeout, cli.debug)?;
            cli::list::run(args, &session.client()?, &session.ctx, session.default_user()).await
        }
        Commands::Search(args) => {
            let session = Session::open(config_path, cli.timeout, cli.debug)?;
            cli::search::run(args, &session.client()?, &session.ctx, session.default_user()).await
        }
        Commands::Update(args) => {
            let session = Session::open(config_path, cli.timeout, cli.debug)?;
            cli::update::run(args, &session.client()?, &session.ctx).await
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins when set; otherwise wire
/// logging raises the crate to debug and everything else stays at error.
fn init_tracing(wire: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if wire {
            EnvFilter::new("error,mem0_client=debug")
        } else {
            EnvFilter::new("error")
        }
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Loaded config plus the context every remote call runs under
struct Session {
    config: Config,
    ctx: CallContext,
    debug: bool,
}

impl Session {
    fn open(config_path: Option<&Path>, timeout: Option<u64>, debug: bool) -> Result<Self> {
        let config = Config::load(config_path)?;
        init_tracing(debug || config.api.debug);

        Ok(Self {
            config,
            ctx: call_context(timeout),
            debug,
        })
    }

    fn client(&self) -> Result<RemoteMemoryClient> {
        cli::utils::connect(&self.config, self.debug)
    }

    fn default_user(&self) -> Option<&str> {
        self.config.identity.user_id.as_deref()
    }
}

/// Context cancelled by Ctrl-C, with the optional `--timeout`
fn call_context(timeout: Option<u64>) -> CallContext {
    let ctx = match timeout {
        Some(secs) => CallContext::with_timeout(Duration::from_secs(secs)),
        None => CallContext::background(),
    };

    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            token.cancel();
        }
    });

    ctx
}
