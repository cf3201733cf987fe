use std::fs;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xmk::cli::{Cli, Verbosity};
use xmk::engine::Engine;
use xmk::parser::{parse, parse_capturing_expansion};
use xmk::world::LOCAL_WORLD;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();
    init_tracing(verbosity);

    if let Err(err) = run(&cli, verbosity) {
        if verbosity != Verbosity::Normal {
            eprintln!("[error] xmk: {err}");
        } else {
            eprintln!("[error] {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: &Cli, verbosity: Verbosity) -> xmk::Result<()> {
    let source = fs::read_to_string(&cli.file)
        .map_err(|e| xmk::Error::Io(cli.file.clone(), e))?;

    if cli.preprocess_only {
        let (_model, expanded) = parse_capturing_expansion(source)?;
        print!("{expanded}");
        return Ok(());
    }

    let model = parse(source)?;
    let engine = Engine::new(&model, &LOCAL_WORLD, cli.quiet, verbosity);
    engine.build()?;
    Ok(())
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
