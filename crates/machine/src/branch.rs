use retrace_common::BranchId;
use retrace_timeline::Timeline;

/// One independent line of history.
#[derive(Debug, Clone)]
pub struct Branch<Snap, P> {
    id: BranchId,
    parent: Option<BranchId>,
    fork_index: Option<usize>,
    pub(crate) timeline: Timeline<Snap, P>,
    label: Option<String>,
}

impl<Snap, P> Branch<Snap, P> {
    pub(crate) fn root(timeline: Timeline<Snap, P>) -> Self {
        Self {
            id: BranchId::ROOT,
            parent: None,
            fork_index: None,
            timeline,
            label: None,
        }
    }

    pub(crate) fn forked(
        id: BranchId,
        parent: BranchId,
        fork_index: usize,
        timeline: Timeline<Snap, P>,
    ) -> Self {
        Self {
            id,
            parent: Some(parent),
            fork_index: Some(fork_index),
            timeline,
            label: None,
        }
    }

    pub fn id(&self) -> BranchId {
        self.id
    }

    /// Branch this one was forked from; `None` for the root.
    pub fn parent(&self) -> Option<BranchId> {
        self.parent
    }

    /// Index in the parent at which this branch diverged.
    pub fn fork_index(&self) -> Option<usize> {
        self.fork_index
    }

    pub fn timeline(&self) -> &Timeline<Snap, P> {
        &self.timeline
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}
