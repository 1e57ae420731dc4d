use ai_summary::app::App;
use ai_summary::cli::{AppAction, Cli};
use ai_summary::config::Settings;
use ai_summary::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let action = AppAction::from(cli.command);

    let settings = Settings::load()?;
    let app = App::new(settings).await?;

    match app.handle_action(action).await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
