use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use courier_server::{HttpServer, ServerConfig, config};
use courier_wire::percent::PlusPolicy;
use env_logger::Env;

/// Serve the files below a directory over HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory to serve
    root: PathBuf,
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,
    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
    #[arg(long, default_value_t = config::DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,
    /// Decode `+` in request paths as a space
    #[arg(long)]
    plus_as_space: bool,
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

    let mut config = ServerConfig::new(args.root);
    config.addr = SocketAddr::new(args.bind, args.port);
    config.max_connections = args.max_connections;
    if args.plus_as_space {
        config.plus = PlusPolicy::Space;
    }

    let server = match HttpServer::bind(config).await {
        Ok(server) => server,
        Err(err) => {
            log::error!("cannot start: {err}");
            if let Some(cause) = std::error::Error::source(&err) {
                log::error!("  caused by: {cause}");
            }
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        () = server.serve() => ExitCode::SUCCESS,
        res = tokio::signal::ctrl_c() => {
            if let Err(err) = res {
                log::error!("cannot listen for ctrl-c: {err}");
                return ExitCode::FAILURE;
            }
            log::info!("shutting down");
            ExitCode::SUCCESS
        }
    }
}
