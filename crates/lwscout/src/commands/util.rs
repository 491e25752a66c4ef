//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use lwscout_core::{AggregateView, DiscoveryOrchestrator, ObjectModelLoader};

use crate::config::Settings;
use crate::error::CliError;
use crate::output;

/// Build an orchestrator over mDNS and start discovery.
pub async fn start_discovery(settings: &Settings) -> Result<DiscoveryOrchestrator, CliError> {
    let orch = DiscoveryOrchestrator::new(settings.scout.clone())?;
    if let Err(e) = orch.start().await {
        orch.shutdown().await;
        return Err(e.into());
    }
    Ok(orch)
}

/// Let discovery run for `duration` (or until Ctrl+C) and return the
/// view at the end.
pub async fn collect(orch: &DiscoveryOrchestrator, duration: Duration, quiet: bool) -> Arc<AggregateView> {
    let pb = spinner(quiet);
    let mut views = orch.subscribe();
    pb.set_message(progress_message(views.current()));

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted, printing what was found so far");
                break;
            }
            changed = views.changed() => match changed {
                Some(view) => pb.set_message(progress_message(&view)),
                None => break,
            },
        }
    }

    pb.finish_and_clear();
    orch.snapshot()
}

/// Re-render the view on every change until Ctrl+C.
pub async fn watch<F>(orch: &DiscoveryOrchestrator, settings: &Settings, render: F) -> Result<(), CliError>
where
    F: Fn(&AggregateView) -> String,
{
    let mut views = orch.subscribe();
    output::print_output(&render(views.current()), settings.quiet);

    loop {
        tokio::select! {
            biased;
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            changed = views.changed() => {
                let Some(view) = changed else { break };
                output::print_status(progress_message(&view), true, settings.color, settings.quiet);
                output::print_output(&render(&view), settings.quiet);
            }
        }
    }
    Ok(())
}

fn progress_message(view: &AggregateView) -> String {
    format!(
        "Discovering... {} gateway(s), {} device(s)",
        view.gateways.len(),
        view.device_count()
    )
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Schema loader rooted at the configured models directory.
pub fn model_loader(settings: &Settings) -> ObjectModelLoader {
    ObjectModelLoader::from_dir(settings.scout.model_dir.clone())
}
