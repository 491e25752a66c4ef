//! Object links of a single device.

use tabled::Tabled;

use lwscout_core::{Device, DeviceFetcher, ObjectInstance};

use crate::cli::DeviceArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Object")]
    object_id: u16,
    #[tabled(rename = "Instance")]
    instance_id: u16,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&ObjectInstance> for ObjectRow {
    fn from(o: &ObjectInstance) -> Self {
        Self {
            object_id: o.object_id,
            instance_id: o.instance_id,
            path: o.to_string(),
        }
    }
}

pub async fn handle(args: DeviceArgs, settings: &Settings) -> Result<(), CliError> {
    let fetcher = DeviceFetcher::new(&settings.scout)?;
    let device = Device::new(args.endpoint, args.host, fetcher.rest_port());

    let links = fetcher.fetch_object_links(&device).await?;
    let out = output::render_list(settings.output, &links, |o| ObjectRow::from(o), ToString::to_string);
    output::print_output(&out, settings.quiet);
    Ok(())
}
