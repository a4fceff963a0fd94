use std::sync::atomic::{AtomicU32, Ordering};

/// Process-unique identifier for a scene node, used for logging and lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

impl NodeId {
    pub(crate) fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Cleanup callback registered by an external collaborator, run on disposal
pub type DisposeHook = Box<dyn FnOnce()>;
