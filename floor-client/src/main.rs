//! floor-monitor - headless floor watcher
//!
//! Loads the floor, keeps it reconciled on the poll cadence and logs every
//! new snapshot until Ctrl-C.

use floor_client::{ClientConfig, FloorSession, FloorSnapshot, LogNotifier, logger};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env()?;
    logger::init_logger_with_file(
        &config.logging.level,
        config.logging.json,
        config.logging.log_dir.as_deref(),
    )?;

    tracing::info!(
        base_url = %config.base_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Starting floor-monitor"
    );

    let mut session = FloorSession::connect(config, Arc::new(LogNotifier))?;
    if let Err(e) = session.start().await {
        tracing::error!(error = %e, "Initial load failed, waiting for next poll");
    }

    let mut snapshots = session.snapshots();
    log_snapshot(&snapshots.borrow_and_update());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
                tracing::info!("Shutdown signal received");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                log_snapshot(&snapshot);
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

fn log_snapshot(snapshot: &FloorSnapshot) {
    let orders: usize = snapshot.tables.iter().map(|t| t.orders.len()).sum();
    tracing::info!(
        generation = snapshot.generation,
        tables = snapshot.tables.len(),
        occupied = snapshot.occupied_count(),
        orders,
        "Floor snapshot"
    );
    for table in snapshot.tables.iter().filter(|t| t.occupied) {
        for view in &table.orders {
            tracing::debug!(
                table_id = %table.table.id,
                order_id = %view.order.id,
                ready = view.order.is_ready(),
                items = %view.item_names.join(", "),
                "Open order"
            );
        }
    }
}
