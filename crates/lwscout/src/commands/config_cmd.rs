//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let format = global.output.unwrap_or(OutputFormat::Table);
            let out = output::render_single(format, &cfg, render_toml, |_| {
                config::active_config_path(global).display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &config::active_config_path(global).display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::active_config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg)
        .unwrap_or_else(|e| format!("# failed to render config: {e}"))
        .trim_end()
        .to_owned()
}
