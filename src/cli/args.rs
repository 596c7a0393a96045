//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Shared text document, synced between a file and live readers
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: syncpad.toml)
    #[arg(short = 'C', long, default_value = "syncpad.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the document over HTTP with live updates
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Print the document as currently stored on disk
    #[command(visible_alias = "c")]
    Cat {
        /// Document path (overrides `[document] path`)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Document path (overrides `[document] path`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Port for the live-update WebSocket
    #[arg(long = "ws-port")]
    pub ws_port: Option<u16>,

    /// Use native file-system notifications alongside polling
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub native: Option<bool>,
}

#[cfg(test)]
impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["syncpad", "serve"]);
        assert!(cli.is_serve());
        assert_eq!(cli.config, PathBuf::from("syncpad.toml"));
        let Commands::Serve { args } = cli.command else {
            unreachable!()
        };
        assert!(args.file.is_none());
        assert!(args.native.is_none());
    }

    #[test]
    fn test_native_flag_forms() {
        let parse = |argv: &[&str]| match Cli::parse_from(argv).command {
            Commands::Serve { args } => args.native,
            Commands::Cat { .. } => unreachable!(),
        };
        assert_eq!(parse(&["syncpad", "serve", "--native"]), Some(true));
        assert_eq!(parse(&["syncpad", "serve", "--native", "false"]), Some(false));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["syncpad", "s", "-v", "--ws-port", "4000", "-i", "0.0.0.0"]);
        assert!(cli.verbose);
        let Commands::Serve { args } = cli.command else {
            unreachable!()
        };
        assert_eq!(args.ws_port, Some(4000));
        assert_eq!(args.interface, Some("0.0.0.0".parse().unwrap()));
    }

    #[test]
    fn test_cat_file() {
        let cli = Cli::parse_from(["syncpad", "cat", "-f", "notes.txt"]);
        assert!(!cli.is_serve());
        assert!(matches!(cli.command, Commands::Cat { file: Some(_) }));
    }
}
