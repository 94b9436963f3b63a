// Signature Locator CLI
//
// Purpose: Resolve call signatures to shelf locations from the command line
// Usage:
//   cargo run --bin locate -- "001.2 M67s" "863.44 G216c"
//   cargo run --bin locate -- --dump
//
// Prints one JSON object per signature (result or error). `--dump` writes the
// canonical range tables as CSV instead.

use signature_locator::{LocateError, Locator, LocatorConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signature_locator=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = load_config()?;
    tracing::info!("Configuration:");
    tracing::info!("  PRIMARY_PATH: {}", config.primary_path.display());
    tracing::info!(
        "  SECONDARY_PATH: {}",
        config
            .secondary_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    tracing::info!("  SECONDARY_SHEET: {}", config.secondary_sheet);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cache = config.table_cache();
    let tables = cache.get_or_load()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.iter().any(|a| a == "--dump") {
        tables.primary.write_csv(&mut out)?;
        if let Some(secondary) = &tables.secondary {
            writeln!(out)?;
            secondary.write_csv(&mut out)?;
        }
        return Ok(());
    }

    if args.is_empty() {
        anyhow::bail!("usage: locate <signature>... | locate --dump");
    }

    let locator = Locator::from_config(&config);
    let results = locator.locate_batch(&args, &tables.primary, tables.secondary.as_ref());

    for result in results {
        let json = match result {
            Ok(located) => serde_json::to_value(&located)?,
            Err(err) => error_json(&err),
        };
        writeln!(out, "{}", serde_json::to_string(&json)?)?;
    }

    Ok(())
}

/// JSON config from LOCATOR_CONFIG, then per-field environment overrides
fn load_config() -> anyhow::Result<LocatorConfig> {
    let mut config = match std::env::var("LOCATOR_CONFIG") {
        Ok(path) => LocatorConfig::load(&PathBuf::from(path))?,
        Err(_) => LocatorConfig::default(),
    };

    if let Ok(path) = std::env::var("PRIMARY_PATH") {
        config.primary_path = PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("SECONDARY_PATH") {
        config.secondary_path = Some(PathBuf::from(path));
    }
    if let Ok(sheet) = std::env::var("SECONDARY_SHEET") {
        config.secondary_sheet = sheet;
    }

    config.validate()?;
    Ok(config)
}

fn error_json(err: &LocateError) -> serde_json::Value {
    serde_json::json!({
        "error": err.kind(),
        "input": err.input(),
        "message": err.to_string(),
    })
}
