use clap::Parser;
use server::preview::Principal;
use themekit::cli::Cli;
use themekit::commands::App;
use themekit::{config, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut app_config = match config::load_config(cli.config.as_deref()).into_result() {
        Ok(app_config) => app_config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(2);
        }
    };
    if let Some(level) = &cli.log_level {
        app_config.logging_mut().set_level(level.clone());
    }
    if let Err(e) = logger::setup_logger(app_config.logging()) {
        eprintln!("Warning: {}", e.user_message());
    }

    let app = App::from_config(&app_config, Principal::new(cli.principal)).await?;
    match app.run(cli.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Command failed: {e}");
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
