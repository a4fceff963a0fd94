use crate::deps::DependencyManager;
use crate::error::Result;
use crate::lua::node::LuaSceneNode;
use crate::lua::register_scene_module;
use crate::node::{NodeFactory, NodeRef};
use crate::platform::PlatformContext;
use mlua::{Lua, Table};
use std::rc::Rc;
use tracing::debug;

/// Lua state wired to a node factory and dependency manager.
///
/// Scripts drive the tree through `rover.scene`; Rust code can inspect the
/// same nodes through the handles they return.
pub struct SceneRuntime {
    lua: Lua,
    factory: Rc<NodeFactory>,
    deps: DependencyManager,
}

impl SceneRuntime {
    /// Runtime with the built-in drawing kinds
    pub fn new(context: PlatformContext) -> Result<Self> {
        Self::with_factory(NodeFactory::with_builtin_kinds(context))
    }

    pub fn with_factory(factory: NodeFactory) -> Result<Self> {
        let lua = Lua::new();
        let factory = Rc::new(factory);
        let deps = DependencyManager::new();

        lua.set_app_data(factory.clone());
        lua.set_app_data(deps.clone());

        let existing: Option<Table> = lua.globals().get("rover")?;
        let rover_table = match existing {
            Some(table) => table,
            None => {
                let table = lua.create_table()?;
                lua.globals().set("rover", table.clone())?;
                table
            }
        };
        register_scene_module(&lua, &rover_table)?;

        debug!(
            "Scene runtime ready (target={}, types={:?})",
            factory.context().target().as_str(),
            factory.node_types()
        );

        Ok(Self { lua, factory, deps })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub fn deps(&self) -> &DependencyManager {
        &self.deps
    }

    pub fn context(&self) -> &PlatformContext {
        self.factory.context()
    }

    /// Evaluate a chunk that returns a scene node
    pub fn eval_node(&self, script: &str) -> Result<NodeRef> {
        let node: LuaSceneNode = self.lua.load(script).eval()?;
        Ok(node.node)
    }
}
