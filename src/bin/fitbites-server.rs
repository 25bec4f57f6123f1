// ABOUTME: Server binary for the FitBites nutrition API
// ABOUTME: Loads configuration and static nutrition data, then serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `FitBites` Server Binary
//!
//! Environment variables configure everything; command-line flags override
//! the port and the data file locations.

use anyhow::Result;
use clap::Parser;
use fitbites_server::{
    config::environment::ServerConfig, logging, resources::ServerResources, server,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fitbites-server")]
#[command(about = "FitBites - meal photo nutrition estimation and personalized macro targets")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override knowledge base document path
    #[arg(long)]
    knowledge_base: Option<PathBuf>,

    /// Override nutrient catalog document path
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(path) = args.knowledge_base {
        config.data.knowledge_base_path = path;
    }
    if let Some(path) = args.catalog {
        config.data.catalog_path = path;
    }

    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config)?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
