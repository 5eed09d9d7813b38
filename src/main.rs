use std::process;
use std::rc::Rc;

use clap::Parser;

use sluice::access::NetworkDnsClient;
use sluice::cli::Cli;
use sluice::config::Config;
use sluice::handlers::{FileServingHandler, FilterMiddleware, HtAccessFilter};
use sluice::repository::DirectoryFileRepository;
use sluice::server::AsyncHttpServer;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("sluice: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.max_level()?)
        .init();

    let repository = Rc::new(DirectoryFileRepository::new(cli.docroot.clone()));
    let handler = Rc::new(FilterMiddleware::new(
        Rc::new(HtAccessFilter::new(repository.clone(), Rc::new(NetworkDnsClient))),
        Rc::new(FileServingHandler::new(repository)),
    ));

    tracing::info!(docroot = %cli.docroot.display(), model = ?cli.model, "Starting");

    let server = AsyncHttpServer::bind(
        cfg.listen_on(cli.port)?,
        handler,
        cfg.connection_config(),
        cfg.reactor_config(),
    )?;
    server.serve()
}
