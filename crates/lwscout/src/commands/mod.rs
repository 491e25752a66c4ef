//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod gateways;
pub mod objects;
pub mod resource_io;
pub mod resources;
pub mod util;

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(args, settings).await,
        Command::Gateways(args) => gateways::handle(args, settings).await,
        Command::Objects(args) => objects::handle(args, settings).await,
        Command::Resources(args) => resources::handle(&args, settings),
        Command::Read(args) => resource_io::read(args, settings).await,
        Command::Write(args) => resource_io::write(args, settings).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
