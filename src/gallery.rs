//! Certificate gallery component.
//!
//! Fetches the certificates config document, validates it and renders the
//! cards into an exclusively owned render target. Every failure ends in a
//! rendered state inside the target; nothing propagates to the caller.
//!
//! The staggered card reveal runs as a detached task after each paint, so a
//! load returns as soon as the target has been written.

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::time::{sleep_until, Instant};

use crate::error::{ErrorKind, GalleryError};
use crate::fetch::DocumentFetcher;
use crate::models::certificate::CertificateConfig;
use crate::models::settings::{GallerySettings, RevealSettings};
use crate::render::Renderer;
use crate::target::RenderTarget;

/// Terminal state reached by a load or render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadOutcome {
    Rendered { cards: usize, skipped: usize },
    /// Nothing to show: an empty list, no valid entries, or a document
    /// without a usable `certificates` list.
    Empty,
    Failed { kind: ErrorKind },
    /// A newer load was issued before this one finished; nothing was written.
    Superseded,
}

#[derive(Default)]
struct GalleryState {
    /// Sequence number of the most recently issued load.
    issued: u64,
    /// Bumped on every write to the target; a running reveal stops when it changes.
    generation: u64,
    last_entries: Option<CertificateConfig>,
    last_outcome: Option<LoadOutcome>,
}

/// Everything a detached reveal needs to reach.
struct Shared {
    target: Mutex<Box<dyn RenderTarget>>,
    state: Mutex<GalleryState>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, GalleryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_target(&self) -> MutexGuard<'_, Box<dyn RenderTarget>> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reveal card `index` if the target still holds `generation`'s markup.
    fn reveal_if_current(&self, generation: u64, index: usize) -> bool {
        let state = self.lock_state();
        if state.generation != generation {
            return false;
        }
        self.lock_target().reveal(index);
        true
    }
}

pub struct CertificateGallery {
    fetcher: Arc<dyn DocumentFetcher>,
    shared: Arc<Shared>,
    renderer: Renderer,
    source_path: String,
    reveal: RevealSettings,
}

impl CertificateGallery {
    /// Build the gallery and run the first load. Returns `None` when the page
    /// has no container for it, which is a normal condition.
    pub async fn initialize<T>(
        settings: &GallerySettings,
        fetcher: Arc<dyn DocumentFetcher>,
        target: Option<T>,
    ) -> Option<Self>
    where
        T: RenderTarget + 'static,
    {
        let target = match target {
            Some(t) => t,
            None => {
                warn!("Certificates container not found - gallery section is not on this page");
                return None;
            }
        };

        let renderer = match Renderer::new() {
            Ok(r) => r,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };

        let target: Box<dyn RenderTarget> = Box::new(target);
        let gallery = CertificateGallery {
            fetcher,
            shared: Arc::new(Shared {
                target: Mutex::new(target),
                state: Mutex::new(GalleryState::default()),
            }),
            renderer,
            source_path: settings.source_path.clone(),
            reveal: settings.reveal,
        };

        info!(
            "Certificate gallery initialized, loading from: {}",
            gallery.source_path
        );
        gallery.load().await;
        Some(gallery)
    }

    /// Fetch, validate and render the certificates document.
    pub async fn load(&self) -> LoadOutcome {
        let seq = {
            let mut state = self.shared.lock_state();
            state.issued += 1;
            state.issued
        };
        self.run(seq).await
    }

    /// Show the loading placeholder, then load again.
    pub async fn refresh(&self) -> LoadOutcome {
        let seq = {
            let mut state = self.shared.lock_state();
            state.issued += 1;
            let loading = self.renderer.loading_state();
            self.write(&mut state, &loading);
            state.issued
        };
        info!("Refreshing certificates (request #{})", seq);
        self.run(seq).await
    }

    /// Render a parsed document into the target in a single write and start
    /// the card reveal. Invalid entries are skipped; if none remain the empty
    /// state is shown.
    pub fn render(&self, config: CertificateConfig) -> LoadOutcome {
        let (outcome, generation) = {
            let mut state = self.shared.lock_state();
            let outcome = self.apply_config(&mut state, config);
            (outcome, state.generation)
        };
        self.start_reveal(&outcome, generation);
        outcome
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn last_outcome(&self) -> Option<LoadOutcome> {
        self.shared.lock_state().last_outcome.clone()
    }

    /// Snapshot of the last successfully parsed document.
    pub fn last_entries(&self) -> Option<CertificateConfig> {
        self.shared.lock_state().last_entries.clone()
    }

    pub fn card_count(&self) -> usize {
        match self.last_outcome() {
            Some(LoadOutcome::Rendered { cards, .. }) => cards,
            _ => 0,
        }
    }

    // ── Internals ─────────────────────────────────────

    async fn run(&self, seq: u64) -> LoadOutcome {
        info!(
            "Fetching certificates from {} (request #{})",
            self.source_path, seq
        );
        let fetched = self.fetch_config().await;

        let (outcome, generation) = {
            let mut state = self.shared.lock_state();
            if state.issued != seq {
                debug!(
                    "Discarding response for request #{} (latest is #{})",
                    seq, state.issued
                );
                return LoadOutcome::Superseded;
            }
            let outcome = match fetched {
                Ok(config) => self.apply_config(&mut state, config),
                Err(e) => self.apply_failure(&mut state, &e),
            };
            (outcome, state.generation)
        };

        self.start_reveal(&outcome, generation);
        outcome
    }

    async fn fetch_config(&self) -> Result<CertificateConfig, GalleryError> {
        let doc = self.fetcher.fetch(&self.source_path).await?;
        debug!("Fetch response status: {} {}", doc.status, doc.status_text);

        if !doc.is_success() {
            return Err(GalleryError::new(
                ErrorKind::ConfigUnreachable,
                format!("HTTP error! status: {} - {}", doc.status, doc.status_text),
            ));
        }

        let value: Value = serde_json::from_slice(&doc.body)
            .map_err(|e| GalleryError::new(ErrorKind::ConfigMalformed, e.to_string()))?;

        CertificateConfig::from_value(value).ok_or_else(|| {
            GalleryError::new(
                ErrorKind::ConfigShapeInvalid,
                "No certificates array found in JSON data",
            )
        })
    }

    fn apply_config(&self, state: &mut GalleryState, config: CertificateConfig) -> LoadOutcome {
        info!("Rendering certificates: {}", config.certificates.len());
        let rendered = self.renderer.cards(&config);
        state.last_entries = Some(config);

        let outcome = if rendered.cards == 0 {
            let empty = self.renderer.empty_state(&self.source_path);
            self.write(state, &empty);
            LoadOutcome::Empty
        } else {
            self.write(state, &rendered.markup);
            LoadOutcome::Rendered {
                cards: rendered.cards,
                skipped: rendered.skipped,
            }
        };

        if rendered.skipped > 0 {
            warn!(
                "{} certificate(s) skipped due to missing fields",
                rendered.skipped
            );
        }
        state.last_outcome = Some(outcome.clone());
        outcome
    }

    fn apply_failure(&self, state: &mut GalleryState, err: &GalleryError) -> LoadOutcome {
        let outcome = if err.kind.is_banner() {
            error!("Certificate loading error: {}", err);
            let banner = self.renderer.error_state(err.kind, &self.source_path);
            self.write(state, &banner);
            LoadOutcome::Failed { kind: err.kind }
        } else {
            warn!("Certificate config has no usable list ({}): {}", err.kind, err.detail);
            let empty = self.renderer.empty_state(&self.source_path);
            self.write(state, &empty);
            LoadOutcome::Empty
        };
        state.last_outcome = Some(outcome.clone());
        outcome
    }

    fn write(&self, state: &mut GalleryState, markup: &str) {
        state.generation += 1;
        self.shared.lock_target().replace(markup);
    }

    /// Kick off the reveal for freshly painted cards. Must be called without
    /// the state lock held. Outside a Tokio runtime every card is revealed
    /// at once.
    fn start_reveal(&self, outcome: &LoadOutcome, generation: u64) {
        let cards = match outcome {
            LoadOutcome::Rendered { cards, .. } => *cards,
            _ => return,
        };

        match Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::downgrade(&self.shared);
                handle.spawn(play_reveal(shared, self.reveal, generation, cards));
            }
            Err(_) => {
                debug!("No async runtime, revealing {} certificates at once", cards);
                for index in 0..cards {
                    if !self.shared.reveal_if_current(generation, index) {
                        break;
                    }
                }
            }
        }
    }
}

/// Reveal cards one by one on the configured schedule. Stops early if the
/// target has been rewritten since `generation` or the gallery was dropped.
async fn play_reveal(shared: Weak<Shared>, reveal: RevealSettings, generation: u64, cards: usize) {
    let start = Instant::now();
    debug!("Animating certificates: {}", cards);

    for index in 0..cards {
        sleep_until(start + reveal.delay_for(index)).await;

        let shared = match shared.upgrade() {
            Some(s) => s,
            None => return,
        };
        if !shared.reveal_if_current(generation, index) {
            debug!("Reveal interrupted after {} of {} cards", index, cards);
            return;
        }
    }
}
