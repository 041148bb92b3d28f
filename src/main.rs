use immich_helper::config::CONFIG_FILE_NAME;
use immich_helper::console::Console;
use immich_helper::wizard::{self, Exit};
use immich_helper::{Config, Error};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so they stay out of the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "immich_helper=warn".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load(Path::new(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::stdio();
    match wizard::run(&mut console, &config).await {
        Ok(Exit::Finished) => ExitCode::SUCCESS,
        Ok(Exit::NoCredentials) => ExitCode::from(1),
        Err(Error::InputClosed) => {
            tracing::info!("input closed, exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "aborted");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
