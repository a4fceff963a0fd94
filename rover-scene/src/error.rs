use crate::node::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Anchor node {anchor:?} is not a child of {parent:?}")]
    AnchorNotFound { parent: NodeId, anchor: NodeId },

    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("Tracked value {0} was disposed")]
    StaleTrackedValue(u32),

    #[error("Lua error: {0}")]
    LuaError(#[from] mlua::Error),
}

pub type Result<T> = std::result::Result<T, SceneError>;

impl From<SceneError> for mlua::Error {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::LuaError(e) => e,
            other => mlua::Error::RuntimeError(other.to_string()),
        }
    }
}
