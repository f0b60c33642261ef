//! CLI module for the answer cache service

pub mod serve;

use clap::{Parser, Subcommand};

/// Semantic answer cache - similarity-based response reuse for Q&A pipelines
#[derive(Parser)]
#[command(name = "qa-answer-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the cache service with its management API
    Serve,
}
