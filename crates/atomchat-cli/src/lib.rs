//! Terminal shell for the atomchat element-facts bot.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use clap::Parser;

use atomchat_client::{
    ApiClient, ApiClientConfig, FileSessionStore, MemorySessionStore, SessionStore,
    resolve_base_url,
};

mod chat;
mod forms;

#[derive(Parser)]
#[command(name = "atomchat")]
#[command(about = "Terminal client for the Periodic Table Facts Bot")]
pub struct AtomchatCli {
    /// Backend base URL (overrides ATOMCHAT_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an account and start a session
    Signup(forms::SignupArgs),
    /// Exchange credentials for a session
    Login(forms::LoginArgs),
    /// Interactive conversation (requires a session)
    Chat,
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let cli = AtomchatCli::parse();

    let (base_url, source) = resolve_base_url(cli.base_url.as_deref())?;
    tracing::debug!(%base_url, source, "resolved backend base url");

    let session: Arc<dyn SessionStore> = match FileSessionStore::default_path() {
        Some(store) => Arc::new(store),
        // No config directory on this platform: the session lives for this
        // process only.
        None => Arc::new(MemorySessionStore::new()),
    };
    let client = Arc::new(ApiClient::new(
        ApiClientConfig::new(base_url),
        Arc::clone(&session),
    )?);

    match cli.command {
        Commands::Signup(args) => forms::signup(&client, &args).await,
        Commands::Login(args) => forms::login(&client, &args).await,
        Commands::Chat => chat::run(client, session).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
