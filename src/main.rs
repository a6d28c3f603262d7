use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use usb_cdc_slots::cdc::CdcService;
use usb_cdc_slots::config::ConfigStore;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

/// cdc-slots command line arguments
#[derive(Parser, Debug)]
#[command(name = "cdc-slots")]
#[command(version, about = "Set up and tear down USB CDC interface slots", long_about = None)]
struct CliArgs {
    /// Configuration file (default: $CDC_SLOTS_CONFIG or /etc/cdc-slots/config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, verbose, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Increase verbosity (-v for verbose, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Apply configuration, print state and tear down immediately
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let filter_handle = init_logging(args.log_level.unwrap_or_default(), args.verbose);

    tracing::info!("Starting cdc-slots v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.unwrap_or_else(get_config_path);
    tracing::info!("Configuration: {}", config_path.display());
    let store = ConfigStore::new(&config_path).await?;
    let config = store.get();

    if let (Some(level), Some(handle)) = (
        configured_level(args.log_level, args.verbose, config.log_level.as_deref()),
        &filter_handle,
    ) {
        match handle.reload(EnvFilter::new(log_filter(level))) {
            Ok(()) => tracing::info!("Log level from configuration: {:?}", level),
            Err(e) => tracing::warn!("Failed to apply configured log level: {}", e),
        }
    }

    let service = CdcService::from_config(&config.cdc);
    if let Err(e) = service.apply_config(&config.cdc).await {
        tracing::error!("Failed to apply CDC configuration: {}", e);
        service.shutdown().await?;
        return Err(e.into());
    }

    let state = service.state().await;
    println!("{}", serde_json::to_string_pretty(&state)?);

    if !args.once {
        tracing::info!("CDC interfaces ready, press Ctrl-C to tear down");
        tokio::signal::ctrl_c().await?;
    }

    service.shutdown().await?;
    Ok(())
}

fn parse_log_level(s: &str) -> Option<LogLevel> {
    LogLevel::from_str(s, true).ok()
}

/// Level from the config file, used only when the command line sets none
fn configured_level(
    cli: Option<LogLevel>,
    verbose_count: u8,
    configured: Option<&str>,
) -> Option<LogLevel> {
    if cli.is_some() || verbose_count > 0 {
        return None;
    }
    configured.and_then(parse_log_level)
}

fn effective_level(level: LogLevel, verbose_count: u8) -> LogLevel {
    // Verbose count overrides log level
    match verbose_count {
        0 => level,
        1 => LogLevel::Verbose,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

fn log_filter(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "usb_cdc_slots=error,cdc_slots=error",
        LogLevel::Warn => "usb_cdc_slots=warn,cdc_slots=warn",
        LogLevel::Info => "usb_cdc_slots=info,cdc_slots=info",
        LogLevel::Verbose => "usb_cdc_slots=debug,cdc_slots=info",
        LogLevel::Debug => "usb_cdc_slots=debug,cdc_slots=debug",
        LogLevel::Trace => "usb_cdc_slots=trace,cdc_slots=trace",
    }
}

/// Install the subscriber before anything else logs
///
/// Returns a handle for swapping the filter later, or `None` when
/// `RUST_LOG` is in charge or a subscriber was already installed.
fn init_logging(
    level: LogLevel,
    verbose_count: u8,
) -> Option<reload::Handle<EnvFilter, Registry>> {
    // Environment variable takes highest priority
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_set = from_env.is_some();
    let filter =
        from_env.unwrap_or_else(|| log_filter(effective_level(level, verbose_count)).into());
    let (filter_layer, handle) = reload::Layer::new(filter);

    match tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        Ok(()) => (!env_set).then_some(handle),
        Err(err) => {
            eprintln!("failed to initialize tracing: {}", err);
            None
        }
    }
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CDC_SLOTS_CONFIG") {
        return PathBuf::from(path);
    }

    PathBuf::from("/etc/cdc-slots/config.json")
}
