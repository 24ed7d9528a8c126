use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use client_core::{Dashboard, EmployeeController, SubmitError};
use shared::{
    criteria::{DateRange, SortField, SortOrder, SortState, ViewMode},
    domain::{Department, EmployeeId, EmployeeStatus},
    error::ApiException,
    validation::EmployeeDraft,
};
use storage::{LocalEmployeeStore, SettingsRepository, Storage, StoredSettings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, normalize_database_url, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Employee records dashboard")]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Simulated store latency in milliseconds.
    #[arg(long, global = true)]
    latency_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the filtered, sorted and paginated employee list.
    List(ListArgs),
    Create(CreateArgs),
    Update {
        id: String,
        #[command(flatten)]
        changes: UpdateArgs,
    },
    Archive {
        id: String,
    },
    Restore {
        id: String,
    },
    /// Remove a record permanently.
    Delete {
        id: String,
    },
    /// Print persisted view preferences.
    Prefs,
    ResetPrefs,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    department: Option<Department>,
    #[arg(long)]
    status: Option<EmployeeStatus>,
    /// Joined on or after (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    /// Joined on or before (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
    #[arg(long)]
    show_archived: bool,
    #[arg(long)]
    sort: Option<SortField>,
    #[arg(long)]
    order: Option<SortOrder>,
    #[arg(long)]
    page: Option<usize>,
    #[arg(long)]
    page_size: Option<usize>,
    #[arg(long)]
    view: Option<ViewMode>,
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    department: String,
    #[arg(long)]
    role: String,
    #[arg(long)]
    joining_date: NaiveDate,
    #[arg(long, default_value = "Active")]
    status: String,
    #[arg(long)]
    score: i64,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    role: Option<String>,
    #[arg(long)]
    joining_date: Option<NaiveDate>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    score: Option<i64>,
}

impl UpdateArgs {
    fn apply(self, draft: &mut EmployeeDraft) {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.department {
            draft.department = Some(v);
        }
        if let Some(v) = self.role {
            draft.role = v;
        }
        if let Some(v) = self.joining_date {
            draft.joining_date = Some(v);
        }
        if let Some(v) = self.status {
            draft.status = Some(v);
        }
        if let Some(v) = self.score {
            draft.performance_score = Some(v);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }
    if let Some(latency_ms) = cli.latency_ms {
        settings.latency_ms = latency_ms;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;
    info!(%database_url, latency_ms = settings.latency_ms, "storage ready");

    let preferences = StoredSettings::new(storage.clone());
    match cli.command {
        Command::Prefs => {
            let current = preferences.load().await;
            println!("{}", serde_json::to_string_pretty(&current)?);
            return Ok(());
        }
        Command::ResetPrefs => {
            preferences.reset().await?;
            println!("preferences reset");
            return Ok(());
        }
        _ => {}
    }

    let store = Arc::new(LocalEmployeeStore::with_latency(
        storage,
        settings.latency(),
    ));
    let dashboard = Dashboard::new(
        EmployeeController::new(store),
        Arc::new(preferences),
        settings.search_debounce(),
    )
    .await;
    dashboard
        .refresh()
        .await
        .map_err(ApiException::from)
        .context("failed to load employees")?;

    match cli.command {
        Command::List(args) => list(&dashboard, args).await?,
        Command::Create(args) => {
            dashboard.open_create().await;
            let draft = EmployeeDraft {
                name: args.name,
                department: Some(args.department),
                role: args.role,
                joining_date: Some(args.joining_date),
                status: Some(args.status),
                performance_score: Some(args.score),
            };
            let created = submit(&dashboard, &draft).await?;
            println!("created employee id={}", created);
        }
        Command::Update { id, changes } => {
            let id = EmployeeId::new(id);
            dashboard
                .open_edit(&id)
                .await
                .map_err(ApiException::from)?;
            let mut draft = dashboard
                .drawer()
                .await
                .initial_draft()
                .context("edit drawer did not open")?;
            changes.apply(&mut draft);
            let updated = submit(&dashboard, &draft).await?;
            println!("updated employee id={}", updated);
        }
        Command::Archive { id } => {
            let archived = dashboard
                .archive(&EmployeeId::new(id))
                .await
                .map_err(ApiException::from)?;
            println!("archived employee id={}", archived.id);
        }
        Command::Restore { id } => {
            let restored = dashboard
                .restore(&EmployeeId::new(id))
                .await
                .map_err(ApiException::from)?;
            println!("restored employee id={}", restored.id);
        }
        Command::Delete { id } => {
            let id = EmployeeId::new(id);
            dashboard.delete(&id).await.map_err(ApiException::from)?;
            println!("deleted employee id={id}");
        }
        Command::Prefs | Command::ResetPrefs => {}
    }

    Ok(())
}

async fn submit(dashboard: &Dashboard, draft: &EmployeeDraft) -> Result<EmployeeId> {
    match dashboard.submit(draft).await {
        Ok(saved) => Ok(saved.id),
        Err(SubmitError::Invalid(errors)) => {
            for err in &errors.0 {
                eprintln!("{}: {}", err.field, err.message);
            }
            bail!("employee form has {} invalid field(s)", errors.0.len())
        }
        Err(err) => Err(err.into()),
    }
}

async fn list(dashboard: &Dashboard, args: ListArgs) -> Result<()> {
    if let Some(search) = args.search {
        dashboard.apply_search(search).await;
    }
    dashboard.set_department(args.department).await;
    dashboard.set_status(args.status).await;
    dashboard
        .set_date_range(args.from.zip(args.to).map(|(start, end)| DateRange::new(start, end)))
        .await;
    dashboard.set_show_archived(args.show_archived).await;

    if args.sort.is_some() || args.order.is_some() {
        let current = dashboard.preferences().await.sort;
        let sort = SortState {
            field: args.sort.or(current.field),
            order: args.order.or(current.order).or(Some(SortOrder::Ascend)),
        };
        dashboard.set_sort(sort).await;
    }

    if args.page.is_some() || args.page_size.is_some() {
        let current = dashboard.preferences().await.pagination;
        dashboard
            .set_page(
                args.page.unwrap_or(current.current),
                args.page_size.unwrap_or(current.page_size),
            )
            .await?;
    }

    if let Some(view) = args.view {
        dashboard.set_view_mode(view).await;
    }

    print!("{}", render::render_view(&dashboard.view().await));
    Ok(())
}
