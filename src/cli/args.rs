//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Freeze the routes of a running web application into a static site
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Distribution root (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Append `.html` to generated file names
    #[arg(
        long,
        global = true,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = false
    )]
    pub html_extension: Option<bool>,

    /// Config file path (default: snapsite.toml)
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = "snapsite.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide the progress line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Snapshot every opted-in route into the distribution root
    #[command(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        live: LiveArgs,
    },

    /// List the concrete URIs a run would request, without fetching
    #[command(visible_alias = "r")]
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the distribution root over HTTP
    #[command(visible_alias = "p")]
    Preview {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Live instance overrides for `generate`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LiveArgs {
    /// Host of the running application
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the running application
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum requests in flight (0 = one per CPU)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Keep going after transport failures and report them at the end
    #[arg(long)]
    pub collect_failures: bool,
}
