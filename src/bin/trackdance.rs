// Trackdance CLI
// Replays timed button scripts through the tap-dance engine

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

use trackdance_core::event::{parse_script, Replayer, DEFAULT_SCAN_INTERVAL_MS};
use trackdance_core::{Config, RecordingHost};

/// Tap-dance gesture engine for a five-button trackball
#[derive(Parser, Debug)]
#[command(name = "trackdance")]
#[command(version)]
#[command(about = "Tap-dance gesture engine for a five-button trackball", long_about = None)]
struct Args {
    /// TOML configuration file (defaults to ~/.config/trackdance/config.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Event script to replay, or - for stdin
    #[arg(short, long, value_name = "FILE")]
    script: Option<String>,

    /// Milliseconds between simulated scan ticks
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SCAN_INTERVAL_MS)]
    scan_interval_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Print the shortcut table for both profiles and exit
    #[arg(long)]
    print_shortcuts: bool,
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Config::load_default().context("failed to load default config"),
    }
}

fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read script from stdin")?;
        return Ok(content);
    }
    fs::read_to_string(source).with_context(|| format!("failed to read script {}", source))
}

fn print_shortcuts(config: &Config) {
    let table = config.shortcut_table();
    println!("{:<14} {:<18} windows", "shortcut", "mac");
    for (shortcut, chords) in table.iter() {
        println!(
            "{:<14} {:<18} {}",
            shortcut.to_string(),
            chords.mac.to_string(),
            chords.windows
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;

    if args.check_config {
        let policy = config.timing_policy();
        log::info!("default tapping term {}ms", policy.default_term());
        println!("Configuration is valid");
        return Ok(());
    }

    if args.print_shortcuts {
        print_shortcuts(&config);
        return Ok(());
    }

    let Some(source) = args.script.as_deref() else {
        bail!("--script is required unless --check-config or --print-shortcuts is given");
    };
    let content = read_script(source)?;
    let events = parse_script(&content).with_context(|| format!("invalid script {}", source))?;

    let mut controller = config.controller();
    let mut host = RecordingHost::new();
    Replayer::new(args.scan_interval_ms).run(&mut controller, &mut host, &events);

    for event in host.events() {
        println!("{}", event);
    }

    if !host.is_settled() {
        log::warn!("session ended with keys or layers still held");
    }
    log::debug!("final profile: {}", controller.current_mode());
    Ok(())
}
