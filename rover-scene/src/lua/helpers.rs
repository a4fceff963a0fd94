use crate::deps::DependencyManager;
use crate::node::{NodeFactory, NodeRef};
use mlua::{Lua, Result};
use std::rc::Rc;

/// Get node factory from Lua app_data
pub fn get_factory(lua: &Lua) -> Result<Rc<NodeFactory>> {
    lua.app_data_ref::<Rc<NodeFactory>>()
        .ok_or_else(|| mlua::Error::RuntimeError("Node factory not initialized".into()))
        .map(|f| f.clone())
}

/// Get dependency manager from Lua app_data
pub fn get_deps(lua: &Lua) -> Result<DependencyManager> {
    lua.app_data_ref::<DependencyManager>()
        .ok_or_else(|| mlua::Error::RuntimeError("Dependency manager not initialized".into()))
        .map(|d| d.clone())
}

/// Keep the dependency manager in line with the node's tracked properties
pub fn sync_tracking(lua: &Lua, node: &NodeRef) -> Result<()> {
    let deps = get_deps(lua)?;
    let tracked = node
        .props_container()
        .is_some_and(|c| !c.tracked_bindings().is_empty());

    if tracked {
        deps.subscribe_node(node)?;
    } else {
        deps.unsubscribe(node.id());
    }
    Ok(())
}
