//! Configuration view and validation commands: `uiforge config`.

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use uiforge::config::{CliOverrides, Config};
    use uiforge::uiforge_config::{CONFIG_FILE, UiforgeToml};

    let uiforge_dir = project_dir.join(".uiforge");
    let config_path = uiforge_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("uiforge Configuration");
            println!("=====================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                UiforgeToml::load(&config_path)?
            } else {
                println!("No uiforge.toml found at {}", config_path.display());
                println!("Using default configuration.");
                UiforgeToml::default()
            };
            println!();

            println!("[generator]");
            println!("  command = \"{}\"", toml.generator.command);
            println!("  args = {:?}", toml.generator.args);
            println!();

            println!("[scan]");
            println!("  max_file_size = {}", toml.scan.max_file_size);
            println!("  exclude = {:?}", toml.scan.exclude);
            println!("  skip_dirs = {:?}", toml.scan.skip_dirs);
            println!();

            println!("[workflow]");
            println!("  max_targets = {}", toml.workflow.max_targets);
            println!("  auto_revert = {}", toml.workflow.auto_revert);
            println!("  workspace_dir = \"{}\"", toml.workflow.workspace_dir.display());
            println!();

            println!("[logging]");
            println!("  filter = \"{}\"", toml.logging.filter);
            println!("  format = \"{:?}\"", toml.logging.format);
            println!("  file = {}", toml.logging.file);
            println!();

            println!("Effective values (with env overrides):");
            match Config::new(project_dir.to_path_buf(), CliOverrides::default()) {
                Ok(config) => {
                    println!("  generator = \"{}\"", config.generator_cmd);
                    println!("  repository = {}", config.location);
                }
                Err(err) => println!("  {}", console::style(format!("{:#}", err)).red()),
            }
            println!();

            if !config_path.exists() {
                println!("Run 'uiforge config init' to create a uiforge.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No uiforge.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = UiforgeToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("uiforge.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(&uiforge_dir)?;
            UiforgeToml::default().save(&config_path)?;

            println!("Created uiforge.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [generator] command, args");
            println!("  - [scan] max_file_size, exclude, skip_dirs");
            println!("  - [workflow] max_targets, auto_revert, workspace_dir");
            println!();
        }
    }

    Ok(())
}
