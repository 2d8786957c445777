use std::path::Path;

use histprices::{Capabilities, Config};

const CONFIG_PATH: &str = "histprices.json";

fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::load(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let capabilities = Capabilities::detect(&config);
    tracing::info!(
        "histprices is a library; nothing to run (vendor available: {})",
        capabilities.vendor.is_available()
    );
}
