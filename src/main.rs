
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Method;
use tracing_subscriber::EnvFilter;
use turf_admin::net::request::{RequestBody, RequestOptions};
use turf_admin::state::navigator::DASHBOARD_PATH;
use turf_admin::{AdminConfig, AdminUser, ApiError, AuthContext, AuthError, AuthProvider, TracingNavigator};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing credentials; pass --email/--password or set ADMIN_EMAIL/ADMIN_PASSWORD")]
    MissingCredentials,
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Parser, Debug)]
#[command(name = "turf-admin", about = "Turf booking admin session client")]
struct Cli {
    /// Overrides `ADMIN_API_BASE_URL` from the environment.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "ADMIN_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the current session and print the admin it belongs to.
    Check,
    /// Sign in and print the admin.
    Login,
    /// Sign in, then send one authenticated request.
    Request {
        method: String,
        path: String,
        #[arg(long, help = "JSON request body")]
        data: Option<String>,
        #[arg(long, default_value_t = false, help = "Skip the logout after the request")]
        keep_session: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let Cli { base_url, email, password, command } = Cli::parse();
    let mut config = AdminConfig::from_env();
    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
    }

    let provider = AuthProvider::from_config(&config, Arc::new(TracingNavigator))?;
    let ctx = provider.mount().await;

    match command {
        Command::Check => match ctx.user() {
            Some(user) => print_user(&user),
            None => println!("not authenticated"),
        },
        Command::Login => {
            let admin = login(&ctx, email.as_deref(), password.as_deref()).await?;
            follow_login_navigation(&ctx, config.navigation_delay).await;
            print_user(&admin);
        }
        Command::Request { method, path, data, keep_session } => {
            if ctx.user().is_none() {
                login(&ctx, email.as_deref(), password.as_deref()).await?;
                follow_login_navigation(&ctx, config.navigation_delay).await;
            }
            let method =
                Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| CliError::InvalidMethod(method))?;
            let mut options = RequestOptions::new(method);
            if let Some(raw) = data {
                let payload: serde_json::Value = serde_json::from_str(&raw)?;
                options = options.body(RequestBody::json(&payload)?);
            }

            let response = ctx.api().request(&path, options).await?;
            println!("{}", response.status());
            println!("{}", response.text()?);

            if !keep_session {
                ctx.logout().await;
            }
        }
    }
    Ok(())
}

async fn login(ctx: &AuthContext, email: Option<&str>, password: Option<&str>) -> Result<AdminUser, CliError> {
    let (Some(email), Some(password)) = (email, password) else {
        return Err(CliError::MissingCredentials);
    };
    Ok(ctx.login(email, password).await?)
}

/// A terminal has no router to report routes. Once the post-login navigation
/// has fired, report the dashboard so the session leaves `Navigating`.
async fn follow_login_navigation(ctx: &AuthContext, delay: Duration) {
    tokio::time::sleep(delay).await;
    ctx.on_route_change(DASHBOARD_PATH);
}

fn print_user(user: &AdminUser) {
    println!("{} <{}> role={} id={}", user.name, user.email, user.role, user.id);
}
