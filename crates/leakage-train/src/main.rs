use leakage_storage::Storage;
use leakage_train::cli::{help_text, parse_args, Command};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let config = match parse_args(std::env::args().skip(1).collect()) {
        Ok(Command::Train(config)) => config,
        Ok(Command::Help) => {
            println!("{}", help_text());
            return;
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let storage = Storage::from_env();
    if let Err(err) = leakage_train::run(&config, &storage).await {
        error!("Training job failed: {err}");
        std::process::exit(1);
    }
}
