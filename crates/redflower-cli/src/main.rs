use anyhow::{Context, Result};
use redflower_cli::analyze::{CommandOutcome, run_analyze_command, run_validate_command};
use redflower_cli::cli::{Cli, Commands, parse_cli};
use redflower_cli::init::run_init_command;
use redflower_cli::logging::init_logging;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.log_format);

    let outcome = run(cli)?;
    if outcome != CommandOutcome::Completed {
        std::process::exit(outcome.exit_code());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<CommandOutcome> {
    let workspace = cli.workspace.canonicalize().with_context(|| {
        format!(
            "failed to resolve workspace path {}",
            cli.workspace.display()
        )
    })?;
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Init(args) => {
            run_init_command(&workspace, args, &mut out)?;
            Ok(CommandOutcome::Completed)
        }
        Commands::Validate(args) => run_validate_command(&workspace, args, &mut out),
        Commands::Analyze(args) => run_analyze_command(&workspace, args, &mut out),
    }
}
