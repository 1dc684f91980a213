use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signdesk_client::auth::AuthError;
use signdesk_client::config::ClientConfig;
use signdesk_client::error::ApiError;
use signdesk_client::response::{PageRequest, DEFAULT_PAGE_SIZE};
use signdesk_client::Backend;
use signdesk_core::session::{AuthTokens, SessionContext};

#[derive(Parser)]
#[command(name = "signdesk", about = "Signature and workflow backend client")]
struct Cli {
    /// Bearer token for backend calls (see `login`).
    #[arg(long, env = "SIGNDESK_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the provider login URL, or exchange the code it redirected with.
    Login {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// List released flows.
    Flows {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
    /// Show the form fields of a flow.
    Fields { flow_id: String },
    Notifications {
        #[command(subcommand)]
        cmd: NotificationCmd,
    },
    Signature {
        #[command(subcommand)]
        cmd: SignatureCmd,
    },
}

#[derive(Subcommand)]
enum NotificationCmd {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Read { id: String },
    ReadAll,
    Delete { id: String },
}

#[derive(Subcommand)]
enum SignatureCmd {
    Show { id: String },
    Cancel { linear_id: String },
    /// Download one document. Writes the PDF to `--output`, otherwise prints
    /// it as base64 JSON.
    Download {
        signature_id: String,
        cloud_uuid: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("error: {}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "signdesk_cli=info,signdesk_client=info".into());
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn user_message(err: &anyhow::Error) -> String {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.user_message();
    }
    if let Some(auth) = err.downcast_ref::<AuthError>() {
        return auth.user_message();
    }
    format!("{err:#}")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("invalid configuration")?;
    let session = SessionContext::new();
    if let Some(access_token) = cli.access_token {
        session.login(
            AuthTokens {
                access_token,
                refresh_token: None,
                id_token: None,
                expires_at: None,
            },
            None,
        );
    }
    let backend = Backend::new(&config, session)?;

    match cli.cmd {
        Command::Login { code: None, state } => {
            let state = state.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            println!("{}", backend.auth.authorization_url(&state)?);
        }
        Command::Login {
            code: Some(code), ..
        } => {
            let tokens = backend.auth.exchange_code(&code).await?;
            print_json(&serde_json::json!({
                "tokens": tokens,
                "profile": backend.session.profile(),
            }))?;
        }
        Command::Flows { page, page_size } => {
            let flows = backend
                .workflow
                .list_released_flows(PageRequest::new(page, page_size))
                .await?;
            print_json(&flows)?;
        }
        Command::Fields { flow_id } => {
            print_json(&backend.workflow.flow_fields(&flow_id).await?)?;
        }
        Command::Notifications { cmd } => match cmd {
            NotificationCmd::List { page } => {
                let result = backend
                    .notifications
                    .search(PageRequest::new(page, DEFAULT_PAGE_SIZE))
                    .await?;
                print_json(&result)?;
            }
            NotificationCmd::Read { id } => backend.notifications.mark_as_read(&id).await?,
            NotificationCmd::ReadAll => backend.notifications.mark_all_as_read().await?,
            NotificationCmd::Delete { id } => backend.notifications.delete(&id).await?,
        },
        Command::Signature { cmd } => match cmd {
            SignatureCmd::Show { id } => print_json(&backend.signature.get(&id).await?)?,
            SignatureCmd::Cancel { linear_id } => backend.signature.cancel(&linear_id).await?,
            SignatureCmd::Download {
                signature_id,
                cloud_uuid,
                output,
            } => {
                let preview = backend
                    .signature
                    .download_document(&signature_id, &cloud_uuid)
                    .await?;
                match output {
                    Some(path) => {
                        let bytes = STANDARD.decode(&preview.base64)?;
                        tokio::fs::write(&path, bytes)
                            .await
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        tracing::info!(path = %path.display(), size = preview.size, "Document saved");
                    }
                    None => print_json(&preview)?,
                }
            }
        },
    }
    Ok(())
}
