use amiibo_roulette::{
    Config, ErrorKind,
    report::{Console, Reporter},
};
use clap::Parser;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse_lossy(config.rust_log.clone().unwrap_or_default()),
        )
        .init();

    if let Err(err) = amiibo_roulette::run(&config, &Console, &mut rand::rng()) {
        let kind = err.kind();
        let err = anyhow::Error::new(err).context(format!(
            "could not load amiibo from {}",
            config.source.display()
        ));

        match kind {
            ErrorKind::Internal => {
                error!(?err, "internal error");
                Console.error(&format!("internal error: {err:#}"));
            }
            _ => Console.error(&format!("{err:#}")),
        }

        std::process::exit(kind.exit_code());
    }
}
