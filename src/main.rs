mod cli;

use oga2mp3::{config, conversion::ConversionService, server};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use oga2mp3_common::paths::{is_ogg_audio_file, OUTPUT_EXTENSION};
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    config.apply_env()?;

    // CLI flags win over config file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting oga2mp3 server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

async fn convert_file(
    input: &Path,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    if !is_ogg_audio_file(input) {
        tracing::warn!("{:?} does not look like an Ogg audio file; trying anyway", input);
    }

    let output = output.unwrap_or_else(|| input.with_extension(OUTPUT_EXTENSION));
    if output == input {
        anyhow::bail!("Output path would overwrite the input: {:?}", output);
    }

    let transcoder = Arc::new(server::ffmpeg_transcoder(&config));
    let service = ConversionService::new(transcoder, &config.conversion);

    let written = service
        .convert_file(input, &output)
        .await
        .with_context(|| format!("Failed to convert {:?}", input))?;

    println!(
        "Converted {} -> {} ({} bytes)",
        input.display(),
        output.display(),
        written
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "oga2mp3=trace,oga2mp3_av=trace,oga2mp3_common=debug,tower_http=debug".to_string()
        } else {
            "oga2mp3=debug,oga2mp3_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Convert { input, output } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_file(&input, output, cli.config.as_deref()))
        }
        Commands::CheckTools { json } => check_tools(cli.config.as_deref(), json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("oga2mp3 {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let info = oga2mp3_av::check_ffmpeg(config.tools.ffmpeg_path.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Checking external tools...\n");

    let status = if info.available { "✓" } else { "✗" };
    print!("{} {}", status, info.name);
    if let Some(ref version) = info.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = info.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if info.available {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it (with libmp3lame) to enable conversions.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_summary(&config::Config::default());
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Max body: {} bytes", config.server.max_body_bytes);
    println!("  Temp dir: {}", config.conversion.temp_dir.display());
    println!("  Max concurrent: {}", config.conversion.max_concurrent);
    println!("  Timeout: {}s", config.conversion.timeout_secs);
    println!("  Quality: {}", config.conversion.quality);
    if let Some(ref ffmpeg) = config.tools.ffmpeg_path {
        println!("  ffmpeg: {}", ffmpeg.display());
    }
}
