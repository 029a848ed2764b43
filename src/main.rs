//! Deck Builder - turn a ZIP archive of images into a slide deck.
//!
//! This binary starts the HTTP server or runs a one-off build.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deck_builder::{
    config::{BuildConfig, Cli, Command, ServeConfig},
    pipeline::DeckService,
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Build(config) => run_build(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = config.deck.deck_options();
    let deck_service = DeckService::new()
        .with_limits(config.deck.archive_limits())
        .with_image_error_policy(config.deck.on_image_error);
    let limits = deck_service.limits();

    info!("Deck Builder v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!(
        "  Default slide size: {}x{} px, fit mode: {}",
        options.slide_width_px, options.slide_height_px, options.fit_policy
    );
    info!("  Unreadable images: {}", deck_service.image_error_policy());
    info!(
        "  Limits: {}MB upload, {} entries, {}MB extracted",
        config.max_upload_bytes / (1024 * 1024),
        limits.max_entries,
        limits.max_extracted_bytes / (1024 * 1024)
    );

    let router = create_router(deck_service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Open the upload form in your browser:");
    info!("    open http://{}/", addr);
    info!("");
    info!("  Or upload from the command line:");
    info!(
        "    curl -F images_zip=@images.zip -o presentation.pptx http://{}/",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "deck_builder=debug,tower_http=debug"
    } else {
        "deck_builder=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_defaults(config.deck.deck_options());

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Build Command
// =============================================================================

async fn run_build(config: BuildConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let archive = match tokio::fs::read(&config.input).await {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let deck_service = DeckService::new()
        .with_limits(config.deck.archive_limits())
        .with_image_error_policy(config.deck.on_image_error);
    let options = config.deck.deck_options();

    let output = match Arc::new(deck_service)
        .spawn_build(archive.into(), options)
        .await
    {
        Ok(output) => output,
        Err(e) => {
            error!("Build failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&config.output, &output.document).await {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    for skipped in &output.skipped {
        info!("  skipped {}: {}", skipped.name, skipped.reason);
    }
    info!(
        "Wrote {} ({} slides, {} bytes)",
        config.output.display(),
        output.slide_count,
        output.document.len()
    );

    ExitCode::SUCCESS
}
