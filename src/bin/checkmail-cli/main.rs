use anyhow::{Context, Result};
use checkmail::Checker;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod output;

use args::Cli;
use output::Verdict;

fn init_tracing(verbose: bool) {
    let default = if verbose { "checkmail=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(checker: &Checker, email: &str) -> Verdict {
    if let Err(err) = checker.validate_format(email) {
        return Verdict::BadFormat(err);
    }
    let exchangers = match checker.validate_dns(email) {
        Ok(exchangers) => exchangers,
        Err(err) => return Verdict::Dns(err),
    };
    match checker.validate_smtp(email, &exchangers) {
        Ok(()) => Verdict::Deliverable(exchangers),
        Err(err) => Verdict::Smtp(err),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    output::ensure_supported(cli.format)?;

    let config = cli
        .checker_config()
        .context("configuration invalide (--from et --host sont requis)")?;
    let checker = Checker::new(config);

    let verdict = run(&checker, &cli.to);
    if let Some(preferred) = verdict.exchangers().and_then(<[_]>::first) {
        info!(exchanger = %preferred.host, "recipient accepted");
    }
    output::write_verdict(&cli.to, &verdict, cli.format)?;

    // codes de sortie : 0 OK, 2 adresse refusée, 1 fatal
    if !verdict.is_deliverable() {
        std::process::exit(2);
    }
    Ok(())
}
