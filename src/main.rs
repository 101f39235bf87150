#![deny(clippy::all, nonstandard_style, rust_2018_idioms)]

#[macro_use]
extern crate eyre;

#[macro_use]
extern crate tracing;

use std::process::ExitCode;

use eyre::{Context as _, Result};
use tokio::{runtime::Builder as RuntimeBuilder, signal};

use self::{config::Config, context::Context, util::Args};

mod cache;
mod client;
mod config;
mod context;
mod logging;
mod model;
mod plot;
mod util;

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_worker_guard = logging::init(args.quiet);

    let runtime = RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider was already installed");
    }

    match runtime.block_on(async_main(args)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:?}", err.wrap_err("Critical error in main"));

            ExitCode::FAILURE
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    info!(
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("Config: {}", args.config.display());
    info!("-------------------------------------------------");

    config::init(&args.config).context("failed to initialize config")?;

    let config = Config::get();
    let ctx = Context::new(config);

    tokio::select! {
        res = ctx.run(config) => res,
        res = signal::ctrl_c() => {
            res.context("failed to await ctrl+c")?;

            bail!("received Ctrl+C; aborting")
        }
    }
}
