mod config;

use anyhow::{Context, Result};
use armrest_model::{Model, ModelType, ShapePolicy};
use clap::{Parser, ValueEnum};
use config::Config;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Map a Resource Manager JSON payload and print the normalized model
#[derive(Parser, Debug)]
#[command(name = "armrest-inspect", version, about, long_about = None)]
struct Args {
    /// JSON payload file (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Model type to map the payload with
    #[arg(short, long)]
    model: Option<String>,

    /// Additional catalog files with model type definitions
    #[arg(short, long)]
    catalog: Vec<PathBuf>,

    /// Treat the payload as a list response
    #[arg(short, long)]
    list: bool,

    /// Widen nested types when payloads differ in shape instead of failing
    #[arg(long)]
    extend_shapes: bool,

    /// Print the known model types and exit
    #[arg(long)]
    types: bool,

    /// Remember --model as the default for later runs
    #[arg(long, requires = "model")]
    save_default: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("armrest-inspect started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("armrest-model").join("armrest-inspect.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".armrest-model").join("armrest-inspect.log");
    }
    PathBuf::from("armrest-inspect.log")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let catalog = config.load_catalog(&args.catalog)?;

    if args.types {
        for name in catalog.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let model_name = config.effective_model(args.model.as_deref());
    let ty = catalog.require(&model_name)?;
    let ty = if args.extend_shapes {
        ModelType::builder(model_name.as_str())
            .extends(ty)
            .shape_policy(ShapePolicy::Extend)
            .build()
    } else {
        Arc::clone(ty)
    };

    if args.save_default {
        config
            .set_default_model(&model_name)
            .context("Failed to save config")?;
    }

    let payload = read_payload(args.file.as_deref())?;
    tracing::info!("Mapping payload as {}", model_name);

    if args.list {
        let models = Model::collection(&ty, payload)
            .with_context(|| format!("Failed to map list of {}", model_name))?;
        for model in &models {
            print_model(&ty, model);
        }
        tracing::info!("Mapped {} models", models.len());
    } else {
        let model = Model::new(&ty, payload)
            .with_context(|| format!("Failed to map payload as {}", model_name))?;
        print_model(&ty, &model);
    }

    Ok(())
}

fn read_payload(file: Option<&std::path::Path>) -> Result<Value> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    serde_json::from_str(&content).context("Failed to parse payload JSON")
}

fn print_model(ty: &Arc<ModelType>, model: &Model) {
    println!("{:#}", model);

    for attr in ty.derived_attrs() {
        let value = model.derived(attr.name()).unwrap_or("-");
        println!("{}: {}", attr.name(), value);
    }
    for path in ty.hash_paths() {
        let value = model
            .hash_attr(&path.name)
            .map(Value::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!("{}: {}", path.name, value);
    }

    tracing::debug!("Nested types under {}: {:?}", ty.name(), ty.nested_type_names());
}
