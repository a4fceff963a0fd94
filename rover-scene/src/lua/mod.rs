pub mod helpers;
pub mod node;
pub mod value;

use crate::props::{Attributes, PropValue};
use mlua::{Lua, Result, Table, Value};
use node::LuaSceneNode;
use value::LuaTrackedValue;

fn create_node(lua: &Lua, node_type: &str, props: Option<Table>) -> Result<LuaSceneNode> {
    let factory = helpers::get_factory(lua)?;
    let attrs = match props {
        Some(table) => Attributes::from_lua_table(lua, table)?,
        None => Attributes::new(),
    };
    let node = factory.create(node_type, &attrs)?;
    helpers::sync_tracking(lua, &node)?;
    Ok(LuaSceneNode::new(node))
}

/// Register the scene module with Lua (adds rover.scene)
///
/// Requires `Rc<NodeFactory>` and `DependencyManager` in app_data.
pub fn register_scene_module(lua: &Lua, rover_table: &Table) -> Result<()> {
    let scene = lua.create_table()?;
    let factory = helpers::get_factory(lua)?;

    // rover.scene.create(type, props) - create a node of any registered type
    let create_fn = lua.create_function(|lua, (node_type, props): (String, Option<Table>)| {
        create_node(lua, &node_type, props)
    })?;
    scene.set("create", create_fn)?;

    // rover.scene.Rect { ... } etc. - one constructor per registered type
    for node_type in factory.node_types() {
        let owned = node_type.to_string();
        let ctor = lua.create_function(move |lua, props: Option<Table>| {
            create_node(lua, &owned, props)
        })?;
        scene.set(node_type, ctor)?;
    }

    // rover.scene.value(v) - create a tracked value
    let value_fn = lua.create_function(|lua, value: Value| {
        let value = PropValue::from_lua(lua, value)?;
        if value.is_tracked() {
            return Err(mlua::Error::RuntimeError(
                "A tracked value cannot hold another tracked value".into(),
            ));
        }
        let id = helpers::get_deps(lua)?.create_value(value);
        Ok(LuaTrackedValue::new(id))
    })?;
    scene.set("value", value_fn)?;

    // rover.scene.types() - registered type tags
    let types_fn = lua.create_function(|lua, ()| {
        let factory = helpers::get_factory(lua)?;
        Ok(factory
            .node_types()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>())
    })?;
    scene.set("types", types_fn)?;

    scene.set("target", factory.context().target().as_str())?;
    scene.set("pixel_density", factory.context().pixel_density())?;

    rover_table.set("scene", scene)?;
    Ok(())
}
