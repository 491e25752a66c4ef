//! Gateway command handler.

use tabled::Tabled;

use lwscout_core::AggregateView;

use crate::cli::{DiscoverArgs, OutputFormat};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct GatewayRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Devices")]
    devices: usize,
}

fn render(format: OutputFormat, view: &AggregateView) -> String {
    output::render_list(
        format,
        &view.gateways,
        |g| GatewayRow {
            name: g.name.clone(),
            address: g.address.clone(),
            port: g.port,
            devices: view.devices_at(&g.address).count(),
        },
        |g| g.name.clone(),
    )
}

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
