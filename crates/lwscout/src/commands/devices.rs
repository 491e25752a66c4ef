//! Device command handler.

use tabled::Tabled;

use lwscout_core::{AggregateView, Device};

use crate::cli::{DiscoverArgs, OutputFormat};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Gateway")]
    address: String,
    #[tabled(rename = "REST Port")]
    port: u16,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            endpoint: d.endpoint.clone(),
            address: d.address.clone(),
            port: d.port,
        }
    }
}

fn render(format: OutputFormat, view: &AggregateView) -> String {
    output::render_list(format, &view.devices, |d| DeviceRow::from(d), |d| d.endpoint.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DiscoverArgs, settings: &Settings) -> Result<(), CliError> {
    let orch = util::start_discovery(settings).await?;

    let result = if args.watch {
        util::watch(&orch, settings, |view| render(settings.output, view)).await
    } else {
        let view = util::collect(&orch, args.duration, settings.quiet).await;
        output::print_output(&render(settings.output, &view), settings.quiet);
        Ok(())
    };

    orch.shutdown().await;
    result
}
