use std::cell::OnceCell;
use std::time::SystemTime;

/// One position in a timeline.
///
/// The snapshot cell is either filled at write time (a checkpoint) or lazily
/// on the first reconstruction. Cloning an entry deep-copies its cache.
#[derive(Debug, Clone)]
pub struct Entry<Snap, P> {
    index: usize,
    snapshot: OnceCell<Snap>,
    checkpoint: bool,
    patch: Option<P>,
    label: Option<String>,
    timestamp: SystemTime,
}

impl<Snap, P> Entry<Snap, P> {
    pub(crate) fn new_full(index: usize, snapshot: Snap, label: Option<String>) -> Self {
        Self {
            index,
            snapshot: OnceCell::from(snapshot),
            checkpoint: true,
            patch: None,
            label,
            timestamp: SystemTime::now(),
        }
    }

    pub(crate) fn new_patch(
        index: usize,
        patch: P,
        checkpoint: Option<Snap>,
        label: Option<String>,
    ) -> Self {
        let is_checkpoint = checkpoint.is_some();
        let snapshot = match checkpoint {
            Some(snap) => OnceCell::from(snap),
            None => OnceCell::new(),
        };
        Self {
            index,
            snapshot,
            checkpoint: is_checkpoint,
            patch: Some(patch),
            label,
            timestamp: SystemTime::now(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The snapshot, if stored or already reconstructed.
    pub fn snapshot(&self) -> Option<&Snap> {
        self.snapshot.get()
    }

    /// Whether the snapshot was stored at write time.
    pub fn is_checkpoint(&self) -> bool {
        self.checkpoint
    }

    pub fn patch(&self) -> Option<&P> {
        self.patch.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Fill the cache. A value already present wins; reconstruction is
    /// deterministic so both would be equal.
    pub(crate) fn memoize(&self, snapshot: Snap) -> &Snap {
        self.snapshot.get_or_init(|| snapshot)
    }

    /// Drop a memoized snapshot. Checkpoints are kept.
    pub(crate) fn clear_cache(&mut self) {
        if !self.checkpoint {
            self.snapshot.take();
        }
    }
}
