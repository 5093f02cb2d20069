use clap::Parser;
use icosync::Config;
use icosync::cli::{Cli, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    icosync::init_tracing(&config.general.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}
