pub mod deps;
pub mod drawing;
pub mod error;
pub mod lua;
pub mod node;
pub mod platform;
pub mod props;
pub mod runtime;

// Re-export key types
pub use deps::{DependencyManager, TrackedId};
pub use error::{Result, SceneError};
pub use lua::register_scene_module;
pub use node::{NodeFactory, NodeId, NodeKind, NodeRef, SceneNode};
pub use platform::{PlatformContext, RenderTarget};
pub use props::{Attributes, NodeProp, PropKind, PropValue, PropsContainer};
pub use runtime::SceneRuntime;
