mod generator;
mod prompt;

use feedback_core::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::new();
    log::info!("Starting feedback generation...");

    if let Err(err) = generator::run(&config).await {
        log::error!("Feedback generation failed: {err:#}");
        std::process::exit(1);
    }

    log::info!("File '{}' saved successfully", config.output_path.display());
}
