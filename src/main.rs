use anyhow::{Context, Result};
use log::info;

use morphdeck::{app::MorphApp, config::AppConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut config = AppConfig::default();
    if let Some(arg) = args.next() {
        let card_count: usize = arg
            .parse()
            .with_context(|| format!("card count must be a whole number, got {:?}", arg))?;
        config = config.with_card_count(card_count);
    }
    // URL or path, `{index}` is replaced per card
    if let Some(template) = args.next() {
        config = config.with_image_source(template);
    }

    info!("Starting morphdeck with {} cards", config.card_count);
    MorphApp::new(config)
        .context("failed to set up the application")?
        .run()
        .context("application terminated with an error")?;
    Ok(())
}
