use crate::config::{Config, OutputFormat, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXAMPLE_SCRIPT_NAME: &str = "scenario.json";

const EXAMPLE_SCRIPT: &str = r#"{
  "kind": "person",
  "id": "1",
  "steps": [
    { "step": "local", "op": { "type": "set", "property": "lastName", "new": "Dale" } },
    { "step": "saving" },
    { "step": "local", "op": { "type": "set", "property": "firstName", "new": "Tom" } },
    { "step": "saved" },
    { "step": "saving" },
    { "step": "remote", "op": { "type": "set", "property": "firstName", "new": "Thomas" } },
    { "step": "show" },
    { "step": "saved" },
    { "step": "show" }
  ]
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub output: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let output = match args.output.as_str() {
        "pretty" => OutputFormat::Pretty,
        "json" => OutputFormat::Json,
        other => {
            return Err(anyhow::anyhow!(
                "Invalid output format: {}. Use: pretty or json",
                other
            ))
        }
    };

    println!("{}", "📝 Initializing docsync project...".bright_blue().bold());

    let config = Config {
        output,
        ..Config::default()
    };
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
    write_unless_present(
        &config_path,
        &serde_json::to_string_pretty(&config)?,
        args.force,
    )?;

    let script_path = PathBuf::from(cwd).join(EXAMPLE_SCRIPT_NAME);
    write_unless_present(&script_path, EXAMPLE_SCRIPT, args.force)?;

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", EXAMPLE_SCRIPT_NAME);
    println!("  2. Run: docsync replay {}", EXAMPLE_SCRIPT_NAME);

    Ok(())
}

fn write_unless_present(path: &Path, content: &str, force: bool) -> Result<()> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if path.exists() && !force {
        println!(
            "  {} {} already exists (use --force to overwrite)",
            "⚠️".yellow(),
            name.bright_white()
        );
        return Ok(());
    }

    fs::write(path, content)?;
    println!("  {} Created {}", "✓".green(), name);

    Ok(())
}
