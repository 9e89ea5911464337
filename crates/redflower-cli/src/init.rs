use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use redflower_config::{RedflowerConfig, config_path, ensure_workspace_config, write_workspace_config};

use crate::cli::InitArgs;

pub fn run_init_command(workspace: &Path, args: InitArgs, out: &mut dyn Write) -> Result<()> {
    let path = config_path(workspace);
    let existed = path.exists();

    if args.force {
        write_workspace_config(workspace, &RedflowerConfig::default())
            .with_context(|| format!("failed to write config at {}", path.display()))?;
    } else {
        ensure_workspace_config(workspace)
            .with_context(|| format!("failed to load or create config at {}", path.display()))?;
    }

    let action = match (existed, args.force) {
        (false, _) => "created",
        (true, true) => "overwritten",
        (true, false) => "kept existing",
    };
    writeln!(out, "INIT: {action} {}", path.display()).context("failed to write output")?;
    Ok(())
}
