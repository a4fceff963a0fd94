mod factory;
mod kind;
mod scene_node;
mod types;

pub use factory::{NodeCtor, NodeFactory};
pub use kind::NodeKind;
pub use scene_node::{NodeRef, SceneNode};
pub use types::{DisposeHook, NodeId};
