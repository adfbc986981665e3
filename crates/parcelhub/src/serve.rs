// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parcelhub serve` command implementation.
//!
//! Opens the document store, builds the identity and payment clients, wires
//! the lifecycle services into the HTTP router and serves until Ctrl-C or
//! SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use parcelhub_config::ParcelhubConfig;
use parcelhub_core::{IdentityVerifier, ParcelError, PaymentProcessor};
use parcelhub_firebase::FirebaseVerifier;
use parcelhub_gateway::AppState;
use parcelhub_lifecycle::{PayoutRates, Services};
use parcelhub_stripe::StripeProcessor;
use parcelhub_storage::open_storage;
use tracing::{info, warn};

/// Runs the `parcelhub serve` command.
pub async fn run_serve(config: ParcelhubConfig) -> Result<(), ParcelError> {
    init_tracing(&config.log.level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting parcelhub serve");

    let storage = open_storage(&config.storage).await?;
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(FirebaseVerifier::new(&config.identity)?);
    let processor: Arc<dyn PaymentProcessor> =
        Arc::new(StripeProcessor::new(&config.payments)?);

    let rates = PayoutRates::from(config.payout);
    info!(
        same_district = rates.same_district,
        cross_district = rates.cross_district,
        currency = %config.payments.currency,
        "payout and payment settings loaded"
    );

    let services = Services::new(
        storage.clone(),
        processor.clone(),
        rates,
        config.payments.currency.clone(),
    );
    let state = AppState {
        services,
        verifier,
        storage: storage.clone(),
        processor,
        started_at: Instant::now(),
    };

    let result = parcelhub_gateway::serve(&config.server, state, shutdown_signal()).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "document store did not close cleanly");
    }
    result?;

    info!("parcelhub serve shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("parcelhub={log_level},tower_http=info,warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
