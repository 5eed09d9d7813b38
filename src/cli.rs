//! Command line arguments.
//!
//! `sluice <port> <docroot> [model] [--config FILE]`

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "sluice", version, about = "A single-threaded static file server")]
pub struct Cli {
    /// TCP port to listen on
    pub port: u16,

    /// Directory files are served from
    pub docroot: PathBuf,

    /// Concurrency model
    #[arg(value_enum, default_value_t = Model::Async)]
    pub model: Model,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// How connections are served. Only the reactor-driven model exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Model {
    /// One thread, every connection multiplexed with poll(2)
    Async,
}
