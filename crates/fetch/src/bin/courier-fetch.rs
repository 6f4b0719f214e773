use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use courier_fetch::{FetchConfig, Fetcher, config};
use env_logger::Env;

/// Download one resource over plain HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// URL to download, must start with http://
    url: String,
    /// Directory to save the file in
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = config::DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = FetchConfig {
        output_dir: args.output_dir,
        max_redirects: args.max_redirects,
        user_agent: args.user_agent,
        ..FetchConfig::default()
    };
    match Fetcher::new(config).fetch(&args.url).await {
        Ok(outcome) => {
            println!(
                "'{}' downloaded ({} bytes)",
                outcome.saved_as.display(),
                outcome.bytes_written
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("fetching {} failed: {err}", args.url);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
