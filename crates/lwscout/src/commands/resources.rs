//! Resource definitions from the bundled object schemas.

use tabled::Tabled;

use lwscout_core::ResourceDefinition;

use crate::cli::ResourcesArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Operations")]
    operations: String,
    #[tabled(rename = "Type")]
    value_type: String,
}

impl From<&ResourceDefinition> for ResourceRow {
    fn from(r: &ResourceDefinition) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            operations: r.operations.clone(),
            value_type: r.value_type.clone(),
        }
    }
}

pub fn handle(args: &ResourcesArgs, settings: &Settings) -> Result<(), CliError> {
    let defs = util::model_loader(settings).load_resource_definitions(args.object_id)?;
    let out = output::render_list(settings.output, &defs, |r| ResourceRow::from(r), |r| r.id.to_string());
    output::print_output(&out, settings.quiet);
    Ok(())
}
