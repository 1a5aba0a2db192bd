use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toolforged")]
#[command(author, version, about = "Locate and validate the ffmpeg and ImageMagick binaries")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override a setting after resolution (KEY=VALUE, repeatable, before the subcommand)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Flat TOML file of settings applied after resolution
    #[arg(long, value_name = "FILE", global = true)]
    pub settings_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve ffmpeg and ImageMagick and report whether they can be run
    CheckTools,

    /// Print the value of a single setting
    Get {
        /// Setting name, e.g. FFMPEG_BINARY
        name: String,
    },

    /// List all settings
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty setting name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("FFMPEG_BINARY=/opt/ffmpeg").unwrap(),
            ("FFMPEG_BINARY".to_string(), "/opt/ffmpeg".to_string())
        );
        assert_eq!(
            parse_key_value("X=a=b").unwrap(),
            ("X".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_cli_collects_repeated_overrides() {
        let cli = Cli::parse_from([
            "toolforged",
            "--set",
            "A=1",
            "--set",
            "B=2",
            "get",
            "A",
        ]);
        assert_eq!(
            cli.overrides,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
        assert!(matches!(cli.command, Commands::Get { ref name } if name == "A"));
    }

    #[test]
    fn test_cli_rejects_override_after_subcommand() {
        let result = Cli::try_parse_from([
            "toolforged",
            "--set",
            "A=1",
            "get",
            "A",
            "--set",
            "B=2",
        ]);
        assert!(result.is_err());
    }
}
