mod cli;

use toolforged::{config, settings, SettingValue};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::collections::BTreeMap;
use std::path::Path;
use toolforged_av::{check_tool, SystemLauncher, ToolKind};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "toolforged=debug,toolforged_av=debug".to_string()
        } else {
            "toolforged=warn,toolforged_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CheckTools => {
            startup(cli.config.as_deref(), &cli.overrides, cli.settings_file.as_deref())?;
            check_tools()
        }
        Commands::Get { ref name } => {
            startup(cli.config.as_deref(), &cli.overrides, cli.settings_file.as_deref())?;
            let value = settings::get_setting(name)?;
            println!("{}", value);
            Ok(())
        }
        Commands::List { json } => {
            startup(cli.config.as_deref(), &cli.overrides, cli.settings_file.as_deref())?;
            list_settings(json)
        }
        Commands::Validate {
            config: ref config_path,
        } => {
            let path = config_path.as_ref().or(cli.config.as_ref());
            validate_config(path.map(|p| p.as_path()))
        }
        Commands::Version => {
            println!("toolforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load config, resolve both tools into the global store, then apply
/// command-line overrides.
fn startup(
    config_path: Option<&Path>,
    overrides: &[(String, String)],
    settings_file: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    settings::init(&config).context("Failed to resolve external tools")?;

    if !overrides.is_empty() || settings_file.is_some() {
        let overrides = overrides
            .iter()
            .map(|(k, v)| (k.clone(), parse_setting_value(k, v)));
        settings::change_settings(overrides, settings_file)?;
    }

    Ok(())
}

/// Interpret a command-line value as a boolean or number when it looks like
/// one, else as a string. Tool locations are always strings.
fn parse_setting_value(key: &str, raw: &str) -> SettingValue {
    if ToolKind::ALL.iter().any(|kind| kind.setting_name() == key) {
        return SettingValue::String(raw.to_string());
    }

    if let Ok(b) = raw.parse::<bool>() {
        SettingValue::Bool(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        SettingValue::Integer(i)
    } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        SettingValue::Float(f)
    } else {
        SettingValue::String(raw.to_string())
    }
}

fn check_tools() -> Result<()> {
    let store = settings::snapshot();
    let launcher = SystemLauncher::new();

    for kind in ToolKind::ALL {
        let resolution = store.tool(kind)?;
        let info = check_tool(&launcher, kind, &resolution);

        let status = if info.available { "✓" } else { "✗" };
        println!("{} toolforged : {}", status, info.summary());

        print!("    {} = {}", info.setting, info.value);
        if let Some(ref version) = info.version {
            print!(" ({})", version);
        }
        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    Ok(())
}

fn list_settings(json: bool) -> Result<()> {
    let store = settings::snapshot();

    if json {
        let map: BTreeMap<&str, &SettingValue> = store.iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, value) in store.iter() {
            println!("{} = {}", name, value);
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  ffmpeg: {}", config.tools.ffmpeg_binary);
            println!("  ImageMagick: {}", config.tools.imagemagick_binary);
            match &config.tools.resources_dir {
                Some(dir) => println!("  Resources dir: {}", dir.display()),
                None => println!("  Resources dir: (default)"),
            }
            match config.tools.probe_timeout_secs {
                Some(secs) => println!("  Probe timeout: {}s", secs),
                None => println!("  Probe timeout: none"),
            }
            println!("  Extra settings: {}", config.settings.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  ffmpeg: {}", config.tools.ffmpeg_binary);
            println!("  ImageMagick: {}", config.tools.imagemagick_binary);
        }
    }

    Ok(())
}
