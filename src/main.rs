use fsrouter::cli::run_cli;
use fsrouter::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    run_cli()
}
