use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::fetch::DocumentFetcher;
use crate::gallery::{CertificateGallery, LoadOutcome};
use crate::models::settings::GallerySettings;
use crate::target::RenderTarget;

/// Read-only status of the page's components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageStatus {
    pub certificate_gallery: bool,
    pub source_path: String,
    pub last_outcome: Option<LoadOutcome>,
    pub cards: usize,
}

/// Owns the page's certificate gallery, constructed once at startup.
pub struct PortfolioPage {
    source_path: String,
    gallery: Option<CertificateGallery>,
}

impl PortfolioPage {
    /// Start the page. `target` is `None` when the page has no certificates
    /// section; the page still starts, without a gallery.
    pub async fn start<T>(
        settings: &GallerySettings,
        fetcher: Arc<dyn DocumentFetcher>,
        target: Option<T>,
    ) -> Self
    where
        T: RenderTarget + 'static,
    {
        let gallery = CertificateGallery::initialize(settings, fetcher, target).await;
        PortfolioPage {
            source_path: settings.source_path.clone(),
            gallery,
        }
    }

    pub fn gallery(&self) -> Option<&CertificateGallery> {
        self.gallery.as_ref()
    }

    /// Re-run the gallery load behind the loading placeholder.
    pub async fn refresh_certificates(&self) -> Option<LoadOutcome> {
        match &self.gallery {
            Some(g) => Some(g.refresh().await),
            None => {
                warn!("Certificate gallery not initialized");
                None
            }
        }
    }

    pub fn status(&self) -> PageStatus {
        PageStatus {
            certificate_gallery: self.gallery.is_some(),
            source_path: self.source_path.clone(),
            last_outcome: self.gallery.as_ref().and_then(|g| g.last_outcome()),
            cards: self.gallery.as_ref().map(|g| g.card_count()).unwrap_or(0),
        }
    }
}
