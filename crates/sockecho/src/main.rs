mod config;
mod layers;
mod listener;
mod resolve;
mod util;


use clap::Parser;
use config::{Args, Config};
use layers::echo::EchoService;
use listener::Listener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::try_from(Args::parse())?;
    let listener = Listener::bind(&config).await?;
    if let Some(addr) = listener.local_addr()? {
        info!(%addr, "bound");
    }
    println!("Waiting for incoming connections");

    let handle = listener::spawn(listener, EchoService, config.recv_buffer);
    let closer = handle.closer();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupted");
                closer.close();
            }
            Err(err) => error!(%err, "could not wait for ctrl-c"),
        }
    });

    handle.join().await
}
