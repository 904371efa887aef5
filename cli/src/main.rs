#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use school_portal::config::{ConfigError, PortalConfig};
use school_portal::net::api::HttpApiClient;
use school_portal::net::types::{ApiError, Collection, User};
use school_portal::routing::{GuardDecision, RouteGuard, resolve_dashboard};
use school_portal::state::{AuthError, AuthManager, AuthState};
use school_portal::store::{FileStorage, TokenStore};
use school_portal::util::nav::MemoryNavigator;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

const STATE_DIR_NAME: &str = "school-portal";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("login rejected: check email and password")]
    LoginRejected,
    #[error("not logged in; run `portal login` first")]
    NotLoggedIn,
    #[error("session expired; run `portal login` again")]
    SessionExpired,
    #[error("no state directory; pass --state-dir or set PORTAL_STATE_DIR")]
    MissingStateDir,
    #[error("--data must be a JSON object")]
    NotAnObject,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal", about = "School portal session and admin CLI")]
struct Cli {
    /// Overrides PORTAL_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "PORTAL_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    config: PortalConfig,
    state_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the locally persisted session without contacting the backend.
    Whoami,
    /// Re-fetch the profile from the backend.
    Profile,
    Dashboard {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    Users(UsersCommand),
    Records(RecordsCommand),
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Register {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
    ToggleStatus {
        id: String,
    },
    ResetPassword {
        id: String,
    },
    SendCredentials {
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct RecordsCommand {
    collection: Collection,

    #[command(subcommand)]
    command: RecordsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RecordsSubcommand {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
}

type Session = AuthManager<HttpApiClient<FileStorage>, FileStorage, MemoryNavigator>;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = build_context(cli.base_url.as_deref(), cli.state_dir)?;

    match cli.command {
        Command::Login { email, password } => run_login(&ctx, &email, &password).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Whoami => run_whoami(&ctx),
        Command::Profile => run_profile(&ctx).await,
        Command::Dashboard { role, id } => run_dashboard(&ctx, role.as_deref(), id.as_deref()),
        Command::Users(users) => run_users(&ctx, users).await,
        Command::Records(records) => run_records(&ctx, records).await,
    }
}

fn build_context(base_url: Option<&str>, state_dir: Option<PathBuf>) -> Result<CliContext, CliError> {
    let config = PortalConfig::from_env()?;
    let config = match base_url {
        Some(url) => config.with_base_url(url)?,
        None => config,
    };
    let state_dir = state_dir
        .or_else(|| dirs::data_dir().map(|dir| dir.join(STATE_DIR_NAME)))
        .ok_or(CliError::MissingStateDir)?;
    tracing::debug!(base_url = %config.base_url, state_dir = %state_dir.display(), "cli context");
    Ok(CliContext { config, state_dir })
}

fn open_session(ctx: &CliContext) -> Result<Session, CliError> {
    let tokens = TokenStore::new(FileStorage::new(ctx.state_dir.clone()));
    let api = HttpApiClient::new(ctx.config.clone(), tokens.clone())?;
    let session = AuthManager::new(api, tokens, MemoryNavigator::new("/"));
    session.restore();
    Ok(session)
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

async fn run_login(ctx: &CliContext, email: &str, password: &str) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    if !session.login(email, password).await? {
        return Err(CliError::LoginRejected);
    }
    print_json(&session_summary(&session.state()))
}

async fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    session.logout().await;
    report_navigation(session.navigator());
    print_json(&json!({ "loggedOut": true }))
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    print_json(&session_summary(&session.state()))
}

async fn run_profile(ctx: &CliContext) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    if session.state().token.is_none() {
        return Err(CliError::NotLoggedIn);
    }
    session.refresh_profile().await;
    report_navigation(session.navigator());

    let state = session.state();
    if !state.is_authenticated {
        return Err(CliError::SessionExpired);
    }
    print_json(&session_summary(&state))
}

fn run_dashboard(ctx: &CliContext, role: Option<&str>, id: Option<&str>) -> Result<(), CliError> {
    if let Some(role) = role {
        return print_json(&json!({ "dashboard": resolve_dashboard(role, id) }));
    }

    let session = open_session(ctx)?;
    let state = session.state();
    match RouteGuard::new().evaluate(&state) {
        GuardDecision::Allow => print_json(&json!({ "dashboard": dashboard_for(&state) })),
        GuardDecision::Loading | GuardDecision::Redirect(_) => Err(CliError::NotLoggedIn),
    }
}

// =============================================================================
// ADMIN COMMANDS
// =============================================================================

async fn run_users(ctx: &CliContext, users: UsersCommand) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    let api = session.api();
    let json = match users.command {
        UsersSubcommand::List => api.list_users().await?,
        UsersSubcommand::Register { data } => api.register_user(&parse_data(&data)?).await?,
        UsersSubcommand::Update { id, data } => api.update_user(&id, &parse_data(&data)?).await?,
        UsersSubcommand::Delete { id } => api.delete_user(&id).await?,
        UsersSubcommand::ToggleStatus { id } => api.toggle_user_status(&id).await?,
        UsersSubcommand::ResetPassword { id } => api.reset_user_password(&id).await?,
        UsersSubcommand::SendCredentials { data } => api.send_credentials(&parse_data(&data)?).await?,
    };
    print_json(&json)
}

async fn run_records(ctx: &CliContext, records: RecordsCommand) -> Result<(), CliError> {
    let session = open_session(ctx)?;
    let api = session.api();
    let collection = records.collection;
    let json = match records.command {
        RecordsSubcommand::List => api.list_records(collection).await?,
        RecordsSubcommand::Get { id } => api.get_record(collection, &id).await?,
        RecordsSubcommand::Create { data } => api.create_record(collection, &parse_data(&data)?).await?,
        RecordsSubcommand::Update { id, data } => {
            api.update_record(collection, &id, &parse_data(&data)?).await?
        }
        RecordsSubcommand::Delete { id } => api.delete_record(collection, &id).await?,
    };
    print_json(&json)
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_data(raw: &str) -> Result<Value, CliError> {
    let value = serde_json::from_str::<Value>(raw)?;
    if !value.is_object() {
        return Err(CliError::NotAnObject);
    }
    Ok(value)
}

fn dashboard_for(state: &AuthState) -> Option<String> {
    state
        .user
        .as_ref()
        .map(|user| user.role.dashboard_path(Some(&user.id)))
}

fn session_summary(state: &AuthState) -> Value {
    json!({
        "authenticated": state.is_authenticated,
        "displayName": state.user.as_ref().map(User::display_name),
        "user": state.user,
        "dashboard": dashboard_for(state),
    })
}

fn report_navigation(navigator: &MemoryNavigator) {
    for navigation in navigator.take_history() {
        eprintln!("navigate: {}", navigation.path());
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
