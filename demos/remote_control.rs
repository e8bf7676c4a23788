//! # Remote control
//!
//! Cycles the wall through every formation from a background thread, using
//! the same message path as an embedding application would.
//!
//! Run with: `cargo run --example remote_control`

use std::thread;
use std::time::Duration;

use morphdeck::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::default().with_card_count(40);
    let app = MorphApp::new(config)?;
    let handle = app.control_handle();

    thread::spawn(move || {
        for formation in Formation::ALL.into_iter().cycle() {
            thread::sleep(Duration::from_secs(5));
            if handle
                .transform(formation, Duration::from_millis(1500))
                .is_err()
            {
                // Window closed
                break;
            }
        }
    });

    app.run()?;
    Ok(())
}
