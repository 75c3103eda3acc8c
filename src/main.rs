use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monthplan::{
    api,
    client::{self, HttpStore},
    config::{AuthConfig, ClientConfig, ServerConfig, DEFAULT_HOST, DEFAULT_JWT_SECRET, DEFAULT_PORT},
    db::{self, Database},
    models::{Identity, NewPlan, Plan, PlanPatch},
};

#[derive(Parser)]
#[command(name = "monthplan")]
#[command(about = "Monthly exercise plan tracker")]
struct Cli {
    /// Path of the JSON store file
    #[arg(long, env = "MONTHPLAN_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Secret used to sign access tokens
        #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
        jwt_secret: String,
    },
    /// Check whether a server is up
    Status {
        /// API root of the server
        #[arg(long, env = "MONTHPLAN_API", default_value = "http://127.0.0.1:4000/api")]
        api: String,
    },
    /// Copy the store file to a timestamped backup next to it
    Backup,
    /// List store backups
    Backups,
    /// Read and edit plans
    Plans {
        #[command(flatten)]
        client: ClientArgs,

        #[command(subcommand)]
        action: PlanCommand,
    },
}

#[derive(Args)]
struct ClientArgs {
    /// API root of a running server; plans are read from --db when unset
    #[arg(long, env = "MONTHPLAN_API")]
    api: Option<String>,

    /// Access token for user-owned plans
    #[arg(long, env = "MONTHPLAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Act as this signed-in user
    #[arg(long, env = "MONTHPLAN_USER")]
    user: Option<String>,

    /// Anonymous session id; a new one is generated when neither this nor --user is set
    #[arg(long, env = "MONTHPLAN_SESSION")]
    session: Option<String>,
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Show plans for a day
    List {
        /// Day as YYYY-MM-DD, today when omitted
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Add a plan
    Add {
        /// Exercise, e.g. "treadmill"
        exercise_type: String,

        /// Unit of the quantity, e.g. "minutes"
        #[arg(short, long)]
        unit: Option<String>,

        #[arg(short, long, default_value_t = 0.0)]
        quantity: f64,

        #[arg(short, long)]
        date: Option<String>,
    },
    /// Change fields of a plan
    Update {
        id: String,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        exercise_type: Option<String>,

        #[arg(short, long)]
        unit: Option<String>,

        #[arg(short, long)]
        quantity: Option<f64>,
    },
    /// Mark a plan as completed
    Done {
        id: String,

        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete a plan
    Remove { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "monthplan=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            jwt_secret,
        }) => {
            serve(ServerConfig {
                host,
                port,
                db_path: cli.db,
                auth: AuthConfig::with_secret(jwt_secret),
            })
            .await?;
        }
        Some(Commands::Status { api }) => {
            let store = HttpStore::new(api, None);
            match store.health().await {
                Ok(health) => println!("{} is up (status: {})", store.base(), health.status),
                Err(e) => println!("{} is not reachable: {e}", store.base()),
            }
        }
        Some(Commands::Backup) => {
            let db = open_store(cli.db)?;
            match db.backup()? {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("store file does not exist"),
            }
        }
        Some(Commands::Backups) => {
            let db = open_store(cli.db)?;
            for backup in db.backups()? {
                println!("{}", backup.path.display());
            }
        }
        Some(Commands::Plans { client, action }) => {
            run_plans(cli.db, client, action).await?;
        }
        None => {
            serve(ServerConfig {
                db_path: cli.db,
                ..Default::default()
            })
            .await?;
        }
    }

    Ok(())
}

fn open_store(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let path = match path {
        Some(path) => path,
        None => db::default_path()?,
    };
    Database::open(path)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if config.auth.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set, tokens are signed with the development secret");
    }

    let db = config.open_database()?;
    tracing::info!(store = ?db.path(), "opened record store");

    let app = api::create_router(db, config.auth.clone());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    tracing::info!("monthplan server listening on http://{}", config.addr());

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_plans(db_path: Option<PathBuf>, args: ClientArgs, action: PlanCommand) -> anyhow::Result<()> {
    let store = client::connect(&ClientConfig {
        api_base: args.api,
        db_path,
        token: args.token,
    })?;

    let generated = args.user.is_none() && args.session.as_deref().map_or(true, str::is_empty);
    let who = client::client_identity(args.user, args.session);
    if generated {
        eprintln!("using new session {} (pass --session to reuse it)", who.as_str());
    }

    match action {
        PlanCommand::List { date } => {
            let date = date.unwrap_or_else(today);
            for plan in store.list(&date, &who).await? {
                println!("{}", format_plan(&plan));
            }
        }
        PlanCommand::Add {
            exercise_type,
            unit,
            quantity,
            date,
        } => {
            let input = NewPlan::exercise(exercise_type, unit, quantity, date.unwrap_or_else(today));
            let plan = store.insert(&who, input).await?;
            println!("{}", format_plan(&plan));
        }
        PlanCommand::Update {
            id,
            content,
            exercise_type,
            unit,
            quantity,
        } => {
            let patch = PlanPatch {
                content,
                exercise_type: exercise_type.map(Some),
                unit: unit.map(Some),
                quantity,
                completed: None,
            };
            print_updated(store.update(&id, &who, patch).await?, &id, &who)?;
        }
        PlanCommand::Done { id, undo } => {
            let plan = store.update(&id, &who, PlanPatch::completed(!undo)).await?;
            print_updated(plan, &id, &who)?;
        }
        PlanCommand::Remove { id } => {
            if !store.delete(&id, &who).await? {
                anyhow::bail!("no plan {id} for {who}");
            }
            println!("removed {id}");
        }
    }

    Ok(())
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn print_updated(plan: Option<Plan>, id: &str, who: &Identity) -> anyhow::Result<()> {
    match plan {
        Some(plan) => {
            println!("{}", format_plan(&plan));
            Ok(())
        }
        None => anyhow::bail!("no plan {id} for {who}"),
    }
}

fn format_plan(plan: &Plan) -> String {
    let mark = if plan.completed { "x" } else { " " };
    let unit = plan.unit.as_deref().unwrap_or("");
    format!(
        "[{mark}] {}  {}  {} {unit}",
        plan.id, plan.content, plan.quantity
    )
    .trim_end()
    .to_string()
}
