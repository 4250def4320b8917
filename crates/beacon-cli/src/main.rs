use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use beacon_core::app::AppBuilder;
use beacon_core::config::BeaconConfig;
use beacon_core::domain::{
    ConnectionId, DEFAULT_CONNECTION_ID, Properties, TaskContext, TaskEnvelope, TaskType,
};
use beacon_core::impls::{
    ChainedCredentialResolver, ContextTemplateRenderer, EnvCredentialResolver, RecordingClientFactory,
    SegmentClientFactory,
};
use beacon_core::ports::{AnalyticsClientFactory, Clock, IdGenerator, SystemClock, UlidGenerator};
use beacon_core::segment::SegmentTrackEventOperator;
use beacon_core::typed::{Operator, Services};

mod logging;

#[derive(Debug, Parser)]
#[command(name = "beacon", version, about = "Send Segment track events as workflow tasks")]
struct Cli {
    /// Config file (defaults to ./beacon.toml when present)
    #[arg(long, global = true, env = "BEACON_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one track event built from flags
    Track(TrackArgs),
    /// Execute a task envelope (JSON file)
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct TrackArgs {
    #[arg(long)]
    user_id: String,

    #[arg(long)]
    event: String,

    /// key=value; the value is parsed as JSON when possible
    #[arg(long = "property", value_name = "KEY=VALUE")]
    properties: Vec<String>,

    /// Properties as a JSON object (merged before --property)
    #[arg(long = "properties", value_name = "JSON")]
    properties_json: Option<String>,

    #[arg(long, default_value = DEFAULT_CONNECTION_ID)]
    conn_id: String,

    #[arg(long)]
    debug: bool,

    /// Record the call instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    envelope: PathBuf,

    /// TaskContext as JSON; defaults to an ad-hoc run at the current time
    #[arg(long)]
    context: Option<PathBuf>,

    #[arg(long)]
    dry_run: bool,
}

fn parse_properties(json: Option<&str>, pairs: &[String]) -> anyhow::Result<Properties> {
    let mut props = match json {
        Some(raw) => serde_json::from_str::<Properties>(raw).context("--properties must be a JSON object")?,
        None => Properties::new(),
    };
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("invalid --property `{pair}`, expected KEY=VALUE");
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        props.insert(key.to_string(), value);
    }
    Ok(props)
}

fn adhoc_context(task_id: &str, clock: &dyn Clock, ids: &dyn IdGenerator) -> TaskContext {
    TaskContext::new("adhoc", task_id, ids.generate_run_id(), clock.now())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BeaconConfig::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init(&config.logging.level)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(SystemClock));

    let (envelope, context, dry_run) = match cli.command {
        Command::Track(args) => {
            let properties = parse_properties(args.properties_json.as_deref(), &args.properties)?;
            let operator = SegmentTrackEventOperator::new(args.user_id, args.event)
                .with_properties(Some(properties))
                .with_conn_id(ConnectionId::new(args.conn_id))
                .with_debug_mode(args.debug);
            let envelope = TaskEnvelope::new(
                TaskType::new(SegmentTrackEventOperator::TYPE),
                serde_json::to_value(&operator)?,
            );
            let context = adhoc_context("track_event", clock.as_ref(), ids.as_ref());
            (envelope, context, args.dry_run)
        }
        Command::Run(args) => {
            let raw = std::fs::read_to_string(&args.envelope)
                .with_context(|| format!("reading {}", args.envelope.display()))?;
            let envelope: TaskEnvelope = serde_json::from_str(&raw).context("parsing task envelope")?;
            let context = match &args.context {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&raw).context("parsing task context")?
                }
                None => adhoc_context(envelope.task_type().as_str(), clock.as_ref(), ids.as_ref()),
            };
            (envelope, context, args.dry_run)
        }
    };

    let resolver = ChainedCredentialResolver::new()
        .then(Arc::new(EnvCredentialResolver::from_env()))
        .then(Arc::new(config.static_resolver()));
    let recorder = RecordingClientFactory::new();
    let clients: Arc<dyn AnalyticsClientFactory> = if dry_run {
        Arc::new(recorder.clone())
    } else {
        Arc::new(
            SegmentClientFactory::new(clock, ids)
                .with_endpoint(config.segment.endpoint.clone())
                .with_timeout(config.timeout()),
        )
    };
    let services = Services::new(Arc::new(resolver), clients, Arc::new(ContextTemplateRenderer::new()));

    let app = AppBuilder::new(services)
        .register::<SegmentTrackEventOperator>()?
        .expect_tasks(&[SegmentTrackEventOperator::TYPE])
        .build()?;

    app.runtime.execute(&envelope, &context).await?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&recorder.calls())?);
    }
    Ok(())
}
