//! disktool - inspect partition tables of disk images and block devices

mod info;
mod ls;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use disktool_pipeline::SourceConfig;
use output::OutputFormat;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "disktool")]
#[command(about = "Inspect partition tables of disk images and block devices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Show verbose debug information
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter directives
    #[arg(long, env = "DISKTOOL_LOG", default_value = "warn", global = true)]
    log_level: String,

    /// Logical block size in bytes, replacing the detected one
    #[arg(long, env = "DISKTOOL_SECTOR_SIZE", global = true)]
    sector_size: Option<u64>,

    /// Use positional reads instead of memory-mapping image files
    #[arg(long, global = true)]
    no_mmap: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show information about a disk image
    Info {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Disk image or block device
        #[arg(value_name = "FILENAME")]
        path: PathBuf,
    },

    /// List partitions on a disk image
    Ls {
        /// Show all entries in the partition table, even the empty ones
        #[arg(short = 'a', long)]
        show_all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Disk image or block device
        #[arg(value_name = "FILENAME")]
        path: PathBuf,
    },
}

impl Cli {
    fn source_config(&self) -> Result<SourceConfig> {
        let config = SourceConfig {
            use_mmap: !self.no_mmap,
            logical_block_size: self.sector_size,
        };
        config.validate()?;
        Ok(config)
    }

    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            return EnvFilter::new("debug");
        }
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here, on stdout
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.source_config()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        None => {
            Cli::command().write_help(&mut out)?;
            Ok(())
        }
        Some(Command::Info { format, path }) => {
            tracing::debug!("info {} ({:?})", path.display(), format);
            info::run(&path, &config, format, &mut out)
        }
        Some(Command::Ls {
            show_all,
            format,
            path,
        }) => {
            tracing::debug!("ls {} (show_all: {}, {:?})", path.display(), show_all, format);
            ls::run(&path, &config, show_all, format, &mut out)
        }
    }
}
