use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::runtime::Runtime;
use valve_inspection_lib::{
    AppConfig, AppState, ConnectivityProbe, init_logging,
    infrastructure::connectivity::TcpConnectivityProbe,
    presentation::dto::inspection_dto::{ListInspectionsRequest, SubmitInspectionRequest},
    presentation::dto::PaginationRequest,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Sync,
    Submit(SubmitArgs),
    List(ListArgs),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SubmitArgs {
    valve_code: Option<String>,
    initial: Option<String>,
    during: Option<String>,
    final_: Option<String>,
    editing_id: Option<String>,
    offline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ListArgs {
    status: Option<String>,
    search: Option<String>,
    limit: Option<u32>,
}

#[derive(Debug, Clone)]
struct CliOptions {
    command: Command,
    data_dir: Option<PathBuf>,
    pretty: bool,
}

fn usage() -> &'static str {
    "Usage: valve_sync <status|sync|submit|list> [--data-dir <path>] [--pretty]\n\
     \x20 submit --valve <code> [--initial <file|url>] [--during <file|url>] [--final <file|url>] [--edit <id>] [--offline]\n\
     \x20 list [--status <em_andamento|concluido>] [--search <text>] [--limit <n>]"
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(args.into_iter())?;
    init_logging();

    let mut config = AppConfig::from_env();
    if let Some(dir) = &options.data_dir {
        let dir = dir.to_string_lossy().trim_end_matches('/').to_string();
        config.database.url = format!("sqlite:{dir}/inspections.db?mode=rwc");
        config.storage.blob_dir = format!("{dir}/blobs");
        config.storage.data_dir = dir;
    }

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(options, config))
}

async fn run(options: CliOptions, config: AppConfig) -> Result<()> {
    let probe_address = config.connectivity.probe_address.clone();
    let probe_timeout = Duration::from_millis(config.connectivity.probe_timeout_ms);
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    state
        .sync_engine
        .recover_interrupted()
        .context("Failed to recover interrupted entries")?;

    if let Some(address) = probe_address {
        let online = TcpConnectivityProbe::new(address, probe_timeout).probe().await;
        state.sync_handler.set_online(online);
    }

    let handler = &state.sync_handler;
    let payload = match options.command {
        Command::Status => to_json(&handler.status(), options.pretty)?,
        Command::Sync => {
            let response = handler
                .sync_pending_data()
                .await
                .context("Sync failed")?;
            to_json(&response, options.pretty)?
        }
        Command::Submit(args) => {
            if args.offline {
                handler.set_online(false);
            }
            let request = build_submit_request(args)?;
            to_json(&handler.submit(request).await, options.pretty)?
        }
        Command::List(args) => {
            let request = ListInspectionsRequest {
                status: args.status,
                search: args.search,
                pagination: args.limit.map(|limit| PaginationRequest {
                    limit: Some(limit),
                    offset: Some(0),
                }),
                ..Default::default()
            };
            let page = handler
                .list_inspections(request)
                .await
                .context("Failed to list inspections")?;
            to_json(&page, options.pretty)?
        }
    };

    println!("{payload}");
    state.shutdown().await;
    Ok(())
}

fn build_submit_request(args: SubmitArgs) -> Result<SubmitInspectionRequest> {
    let Some(valve_code) = args.valve_code else {
        bail!("submit requires --valve\n{}", usage());
    };
    Ok(SubmitInspectionRequest {
        valve_code,
        photo_initial: args.initial.as_deref().map(load_photo).transpose()?,
        photo_during: args.during.as_deref().map(load_photo).transpose()?,
        photo_final: args.final_.as_deref().map(load_photo).transpose()?,
        editing_id: args.editing_id,
    })
}

/// URLs pass through; anything else is read from disk into a data URL.
fn load_photo(source: &str) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") || source.starts_with("data:")
    {
        return Ok(source.to_string());
    }
    let path = Path::new(source);
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let mut command = match iter.next().as_deref() {
        Some("status") => Command::Status,
        Some("sync") => Command::Sync,
        Some("submit") => Command::Submit(SubmitArgs::default()),
        Some("list") => Command::List(ListArgs::default()),
        Some("-h") | Some("--help") => {
            println!("{}", usage());
            std::process::exit(0);
        }
        Some(other) => bail!("Unknown command: {other}\n{}", usage()),
        None => bail!("Missing command\n{}", usage()),
    };
    let mut data_dir: Option<PathBuf> = None;
    let mut pretty = false;

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .ok_or_else(|| anyhow::anyhow!("{flag} requires a value\n{}", usage()))
        };
        match (&mut command, arg.as_str()) {
            (_, "--data-dir") => data_dir = Some(PathBuf::from(value("--data-dir")?)),
            (_, "--pretty") => pretty = true,
            (Command::Submit(submit), "--valve") => submit.valve_code = Some(value("--valve")?),
            (Command::Submit(submit), "--initial") => submit.initial = Some(value("--initial")?),
            (Command::Submit(submit), "--during") => submit.during = Some(value("--during")?),
            (Command::Submit(submit), "--final") => submit.final_ = Some(value("--final")?),
            (Command::Submit(submit), "--edit") => submit.editing_id = Some(value("--edit")?),
            (Command::Submit(submit), "--offline") => submit.offline = true,
            (Command::List(list), "--status") => list.status = Some(value("--status")?),
            (Command::List(list), "--search") => list.search = Some(value("--search")?),
            (Command::List(list), "--limit") => {
                let raw = value("--limit")?;
                let parsed: u32 = raw
                    .parse()
                    .with_context(|| format!("Invalid limit '{raw}'. Expected a positive integer."))?;
                if parsed == 0 {
                    bail!("--limit must be greater than 0");
                }
                list.limit = Some(parsed);
            }
            (_, other) => bail!("Unknown argument: {other}\n{}", usage()),
        }
    }

    Ok(CliOptions {
        command,
        data_dir,
        pretty,
    })
}
