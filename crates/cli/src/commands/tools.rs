//! `anvil tools` — Print the capability listing the backend sees.

use anvil_config::AppConfig;
use anvil_core::tool::ExecutionContext;
use std::path::PathBuf;

pub fn run(workspace: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let root = workspace.unwrap_or_else(|| config.workspace_root());
    let search = anvil_providers::build_search(&config);
    let registry =
        anvil_tools::default_registry(ExecutionContext::new(root), &config.tools, search)?;

    println!();
    println!("  Workspace: {}", registry.context().workspace().display());
    println!("  Tools:     {}", registry.len());
    println!();
    for line in registry.listing().lines() {
        println!("  {line}");
    }
    if !config.tools.allow_scripts {
        println!();
        println!("  run_script is disabled (tools.allow_scripts = false)");
    }
    println!();
    Ok(())
}
