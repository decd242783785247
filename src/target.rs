use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// A container the gallery writes markup into. The gallery takes exclusive
/// ownership of it and only ever replaces its whole contents.
pub trait RenderTarget: Send {
    /// Replace the container's contents in a single write.
    fn replace(&mut self, markup: &str);

    /// Mark card `index` of the current markup as visible.
    fn reveal(&mut self, _index: usize) {}
}

/// Observable state of a `MemoryTarget`.
#[derive(Debug, Clone, Default)]
pub struct TargetSnapshot {
    pub markup: String,
    pub writes: usize,
    /// Every markup payload in write order.
    pub history: Vec<String>,
    /// Card indices revealed since the last write.
    pub revealed: BTreeSet<usize>,
}

/// In-memory container. Clones share the same contents so a host can keep
/// a handle for reading while the gallery owns another for writing.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    inner: Arc<Mutex<TargetSnapshot>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TargetSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn markup(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .markup
            .clone()
    }
}

impl RenderTarget for MemoryTarget {
    fn replace(&mut self, markup: &str) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.markup = markup.to_string();
        state.writes += 1;
        state.history.push(markup.to_string());
        state.revealed.clear();
    }

    fn reveal(&mut self, index: usize) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .revealed
            .insert(index);
    }
}
