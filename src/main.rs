use log::error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use certfolio::models::settings::{Settings, DEFAULT_CONFIG_FILE};
use certfolio::{DocumentFetcher, FileFetcher, HttpFetcher, MemoryTarget, PortfolioPage};

/// Preview the certificate gallery: load it once against the configured
/// source, print the container markup to stdout and the page status to stderr.
#[tokio::main]
async fn main() {
    env_logger::init();

    let config_path = std::env::var("CERTFOLIO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let fetcher: Arc<dyn DocumentFetcher> = match &settings.gallery.base_url {
        Some(base) => match HttpFetcher::new(base, settings.gallery.timeout()) {
            Ok(f) => Arc::new(f),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        None => Arc::new(FileFetcher::new(&settings.gallery.site_root)),
    };

    let target = MemoryTarget::new();
    let page = PortfolioPage::start(&settings.gallery, fetcher, Some(target.clone())).await;

    println!("{}", target.markup());
    match serde_json::to_string_pretty(&page.status()) {
        Ok(status) => eprintln!("{}", status),
        Err(e) => error!("Failed to serialize page status: {}", e),
    }
}
