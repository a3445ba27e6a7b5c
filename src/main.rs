use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use elevatordispatch::config;
use elevatordispatch::init::{self, Startup};
use elevatordispatch::manager::{Dispatcher, Fleet};
use elevatordispatch::network::{self, Connection};
use elevatordispatch::print;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print::err(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let settings = match init::parse_args(&args).context("invalid configuration")? {
        Startup::Run(settings) => settings,
        Startup::Help => {
            println!("{}", init::usage());
            return Ok(());
        }
    };
    print::info(format!("Number of elevators: {}, top floor: {}", settings.cars, settings.top_floor));

    let stream = init::connect_with_retry(&settings.address(), config::RECONNECT_DELAY).await;
    let connection = Connection::new(stream, settings.write_timeout());

    let fleet = Arc::new(Fleet::new(&settings, connection.writer.clone())?);
    let dispatcher = Dispatcher::new(fleet);

    /* START ----------- Starte kritiske tasks ----------- */
    let mut car_loops = dispatcher.spawn_cars();

    let gateway = {
        let dispatcher = dispatcher.clone();
        let limits = settings.limits();
        tokio::spawn(async move {
            print::info("Starting gateway".to_string());
            network::serve(connection.reader, &dispatcher, limits).await
        })
    };
    /* SLUTT ----------- Starte kritiske tasks ----------- */

    // Første task som avsluttar tek ned resten
    tokio::select! {
        result = gateway => {
            result.context("gateway task panicked")?.context("gateway stopped")
        }
        Some(result) = car_loops.join_next() => {
            result.context("car task panicked")?.context("car loop stopped")?;
            Err(anyhow!("car loop ended unexpectedly"))
        }
    }
}
