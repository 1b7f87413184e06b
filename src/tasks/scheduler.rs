use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{interval, sleep, Duration};

use crate::core::state::AppState;
use crate::services::plagiarism::PlagiarismService;
use crate::tasks::plagiarism;

const PLAGIARISM_WORKER_CONCURRENCY: usize = 2;

pub(crate) async fn run(state: AppState) -> Result<()> {
    let service = PlagiarismService::from_settings(state.settings())?;
    if !service.is_configured() {
        tracing::warn!("PLAGIARISM_BASE_URL is empty; checks will retry until it is set");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles = Vec::with_capacity(PLAGIARISM_WORKER_CONCURRENCY + 1);

    for _ in 0..PLAGIARISM_WORKER_CONCURRENCY {
        handles.push(tokio::spawn(check_worker(
            state.clone(),
            service.clone(),
            shutdown_rx.clone(),
        )));
    }

    handles.push(tokio::spawn(requeue_stale_loop(state.clone(), shutdown_rx.clone())));

    crate::core::shutdown::shutdown_signal().await;
    if shutdown_tx.send(true).is_err() {
        tracing::warn!("Failed to broadcast shutdown signal to background tasks");
    }

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Background task join failed");
        }
    }

    Ok(())
}

async fn check_worker(
    state: AppState,
    service: PlagiarismService,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        match plagiarism::process_next_check(&state, &service).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(err) => tracing::error!(error = %err, "Failed to process plagiarism check"),
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sleep(Duration::from_secs(2)) => {}
        }
    }
}

async fn requeue_stale_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let mut tick = interval(Duration::from_secs(600));
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let Err(err) = plagiarism::requeue_stale_checks(&state).await {
                    tracing::error!(error = %err, "requeue_stale_checks failed");
                }
            }
        }
    }
}
