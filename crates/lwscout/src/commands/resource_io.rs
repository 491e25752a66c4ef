//! Single-resource read and write.

use lwscout_core::{Device, Operations, ResourceClient, ResourceCoordinate, ResourceResponse};

use crate::cli::{ReadArgs, ResourcePath, WriteArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn read(args: ReadArgs, settings: &Settings) -> Result<(), CliError> {
    let coordinate = coordinate(args.path, settings);
    if args.strict {
        require(settings, &coordinate, "read", |ops| ops.read)?;
    }

    let client = ResourceClient::new(&settings.scout)?;
    let resp = client.read_resource(&coordinate).await?;
    report(&coordinate, &resp, settings)
}

pub async fn write(args: WriteArgs, settings: &Settings) -> Result<(), CliError> {
    let coordinate = coordinate(args.path, settings);
    if args.strict {
        require(settings, &coordinate, "write", |ops| ops.write)?;
    }

    let client = ResourceClient::new(&settings.scout)?;
    let resp = client.write_resource(&coordinate, &args.value).await?;
    report(&coordinate, &resp, settings)
}

fn coordinate(path: ResourcePath, settings: &Settings) -> ResourceCoordinate {
    Device::new(path.device.endpoint, path.device.host, settings.scout.rest_port).resource(
        path.object_id,
        path.instance_id,
        path.resource_id,
    )
}

/// Check the object schema before touching the network.
fn require(
    settings: &Settings,
    coordinate: &ResourceCoordinate,
    operation: &str,
    allowed: impl Fn(Operations) -> bool,
) -> Result<(), CliError> {
    let defs = util::model_loader(settings).load_resource_definitions(coordinate.object_id)?;
    let def = defs
        .iter()
        .find(|d| d.id == coordinate.resource_id)
        .ok_or(CliError::UnknownResource {
            object_id: coordinate.object_id,
            resource_id: coordinate.resource_id,
        })?;

    if allowed(def.operations()) {
        Ok(())
    } else {
        Err(CliError::OperationNotAllowed {
            resource: coordinate.to_string(),
            operation: operation.into(),
            operations: def.operations.clone(),
        })
    }
}

/// Print the gateway's answer verbatim; a non-2xx status still fails the
/// command so scripts can tell.
fn report(
    coordinate: &ResourceCoordinate,
    resp: &ResourceResponse,
    settings: &Settings,
) -> Result<(), CliError> {
    output::print_status(
        format!("{coordinate}: HTTP {}", resp.status),
        resp.is_success(),
        settings.color,
        settings.quiet,
    );
    let out = output::render_single(settings.output, resp, |r| r.body.clone(), |r| r.body.clone());
    output::print_output(&out, settings.quiet);

    if resp.is_success() {
        Ok(())
    } else {
        Err(CliError::GatewayStatus { status: resp.status })
    }
}
