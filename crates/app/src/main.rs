use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing_subscriber::EnvFilter;

mod db;
use db::DbLocation;

use assess_core::model::{TestId, UserId, UserRecord};
use services::{AppServices, BackendConfig, Clock, Document, LoadSource, SessionConfig};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTestId { raw: String },
    ConflictingSource,
    MissingUser,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTestId { raw } => write!(f, "invalid --test-id value: {raw}"),
            ArgsError::ConflictingSource => write!(f, "use either --test-id or --pdf, not both"),
            ArgsError::MissingUser => write!(f, "signin requires --id, --name and --email"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
    launch_source: Option<LoadSource>,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn launch_source(&self) -> Option<LoadSource> {
        self.launch_source.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Signin,
    Logout,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "signin" => Some(Self::Signin),
            "logout" => Some(Self::Logout),
            _ => None,
        }
    }
}

enum Source {
    Retake(TestId),
    Pdf(PathBuf),
}

struct SigninArgs {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    token: String,
}

struct Args {
    db: DbLocation,
    api_url: Option<String>,
    source: Option<Source>,
    signin: SigninArgs,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--db <sqlite_url>] [--api <url>] [--test-id <id> | --pdf <path>]");
    eprintln!("  cargo run -p app -- signin [--db <sqlite_url>] --id <user_id> --name <name> --email <email> [--token <token>]");
    eprintln!("  cargo run -p app -- logout [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dev.sqlite3");
    eprintln!("  --api {}", services::config::DEFAULT_API_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_DB_URL, ASSESS_API_URL, ASSESS_API_TIMEOUT_SECS,");
    eprintln!("  ASSESS_DURATION_SECS, ASSESS_MAX_TAB_SWITCHES, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let parse_db = |raw: String| {
            DbLocation::parse(&raw, &cwd).ok_or(ArgsError::InvalidDbUrl { raw })
        };
        let mut db = match std::env::var("ASSESS_DB_URL") {
            Ok(raw) => parse_db(raw)?,
            Err(_) => DbLocation::File(cwd.join("dev.sqlite3")),
        };
        let mut api_url = None;
        let mut source = None;
        let mut signin = SigninArgs {
            id: None,
            name: None,
            email: None,
            token: String::new(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    db = parse_db(require_value(args, "--db")?)?;
                }
                "--api" => api_url = Some(require_value(args, "--api")?),
                "--test-id" => {
                    let value = require_value(args, "--test-id")?;
                    let id = value
                        .parse::<TestId>()
                        .map_err(|_| ArgsError::InvalidTestId { raw: value.clone() })?;
                    if source.replace(Source::Retake(id)).is_some() {
                        return Err(ArgsError::ConflictingSource);
                    }
                }
                "--pdf" => {
                    let value = require_value(args, "--pdf")?;
                    if source.replace(Source::Pdf(PathBuf::from(value))).is_some() {
                        return Err(ArgsError::ConflictingSource);
                    }
                }
                "--id" => signin.id = Some(require_value(args, "--id")?),
                "--name" => signin.name = Some(require_value(args, "--name")?),
                "--email" => signin.email = Some(require_value(args, "--email")?),
                "--token" => signin.token = require_value(args, "--token")?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db,
            api_url,
            source,
            signin,
        })
    }

    fn backend_config(&self) -> Result<BackendConfig, services::BackendError> {
        let config = BackendConfig::from_env()?;
        match self.api_url.as_deref() {
            Some(url) => Ok(BackendConfig::new(url)?.with_timeout(config.timeout())),
            None => Ok(config),
        }
    }
}

async fn resolve_source(source: Option<Source>) -> Result<Option<LoadSource>, services::BackendError> {
    match source {
        None => Ok(None),
        Some(Source::Retake(id)) => Ok(Some(LoadSource::Retake(id))),
        Some(Source::Pdf(path)) => {
            let document = Document::read_pdf(&path).await?;
            Ok(Some(LoadSource::Upload(document)))
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    parsed.db.ensure_exists()?;
    let db_url = parsed.db.url();
    let services = AppServices::new_sqlite(
        &db_url,
        Clock::system(),
        parsed.backend_config()?,
        SessionConfig::from_env(),
    )
    .await?;
    tracing::info!(db = %db_url, ?cmd, "services ready");

    match cmd {
        Command::Ui => {
            let launch_source = resolve_source(parsed.source).await?;
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                services,
                launch_source,
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Assess")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Signin => {
            let SigninArgs {
                id: Some(id),
                name: Some(name),
                email: Some(email),
                token,
            } = parsed.signin
            else {
                return Err(ArgsError::MissingUser.into());
            };
            let user = UserRecord::new(UserId::new(id), name, email);
            services.app_state().sign_in(&token, user).await?;
            eprintln!("signed in");
            Ok(())
        }
        Command::Logout => {
            services.app_state().logout().await?;
            eprintln!("signed out");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "app exited with an error");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
