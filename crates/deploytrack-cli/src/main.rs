use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use deploytrack_core::domain::{
    ChecklistDraft, ComponentId, ComponentSpec, Environment, ProjectRecord, ProjectSpec,
    VersionRecord, VersionSpec,
};
use deploytrack_core::impls::InMemoryBackend;
use deploytrack_core::{DeploymentStateStore, PromotionOutcome, StoreBuilder, TrackerConfig};

#[derive(Parser)]
#[command(name = "deploytrack", about = "Deployment state tracker")]
struct Cli {
    /// JSON config file; DEPLOYTRACK_* environment variables are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// tracing filter, e.g. "info" or "deploytrack_core=debug"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print dashboard metrics for a projects fixture.
    Metrics {
        /// JSON array of project records (same shape as the API's /projects).
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Promote a component's version in one environment and print the result.
    Promote {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long)]
        component: u64,
        #[arg(long)]
        env: Environment,
        #[arg(long)]
        version: String,
        #[arg(long)]
        by: Option<String>,
    },
    /// Seed an in-memory portfolio, walk a release through it, print the projects and metrics.
    Demo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromoteReport {
    component: ComponentId,
    environment: Environment,
    already_deployed: bool,
    slot: VersionRecord,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::from_env(),
    };
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Metrics { fixture } => {
            let store = load_store(&fixture, config).await?;
            print_json(&store.metrics())?;
        }
        Command::Promote {
            fixture,
            component,
            env,
            version,
            by,
        } => {
            let mut store = load_store(&fixture, config).await?;
            let component = ComponentId::new(component);
            let outcome = store
                .promote(component, env, &version, by.as_deref())
                .await
                .with_context(|| format!("promoting {component} to {env}"))?;
            let slot = store
                .component(component)
                .map(|c| VersionRecord::from(c.version(env)))
                .with_context(|| format!("{component} disappeared from the snapshot"))?;
            print_json(&PromoteReport {
                component,
                environment: env,
                already_deployed: outcome == PromotionOutcome::AlreadyDeployed,
                slot,
            })?;
        }
        Command::Demo => run_demo(config).await?,
    }

    Ok(())
}

async fn load_store(
    fixture: &Path,
    config: TrackerConfig,
) -> Result<DeploymentStateStore<InMemoryBackend>> {
    let text = std::fs::read_to_string(fixture)
        .with_context(|| format!("reading {}", fixture.display()))?;
    let records: Vec<ProjectRecord> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", fixture.display()))?;

    let mut store = StoreBuilder::new(InMemoryBackend::with_records(records))
        .config(config)
        .build();
    store.refresh().await?;
    Ok(store)
}

async fn run_demo(config: TrackerConfig) -> Result<()> {
    let mut store = StoreBuilder::new(InMemoryBackend::new())
        .config(config)
        .build();

    let payments = store
        .add_project(ProjectSpec::new("Payments").with_description("card and wallet flows"))
        .await?;
    let charge = store
        .add_component(
            payments,
            ComponentSpec::new("charge-lambda", "lambda").with_jira_ticket("PAY-101"),
        )
        .await?;
    let ledger = store
        .add_component(payments, ComponentSpec::new("ledger-api", "api"))
        .await?;

    store
        .replace_checklist(
            charge,
            vec![
                ChecklistDraft::new("smoke tests green"),
                ChecklistDraft::new("rollback plan reviewed"),
                ChecklistDraft::new("product sign-off"),
            ],
        )
        .await?;
    // pending checklist ids are resolved by a full resync
    store.refresh().await?;

    if let Some(first) = store
        .component(charge)
        .and_then(|c| c.checklist.first())
        .map(|item| item.key)
    {
        store.toggle_checklist_item(charge, first).await?;
    }

    for env in [Environment::Dev, Environment::Qa] {
        store.promote(charge, env, "1.4.0", Some("demo")).await?;
    }
    store
        .set_version(charge, Environment::Uat, VersionSpec::new("1.4.0", "in-progress"))
        .await?;
    store
        .set_version(ledger, Environment::Dev, VersionSpec::new("0.9.2", "Failed"))
        .await?;

    let projects: Vec<ProjectRecord> = store.projects().iter().map(ProjectRecord::from).collect();
    print_json(&projects)?;
    print_json(&store.metrics())?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
