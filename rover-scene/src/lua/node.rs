use crate::lua::helpers::sync_tracking;
use crate::node::NodeRef;
use crate::props::{Attributes, PropValue};
use mlua::{AnyUserData, FromLua, Lua, MetaMethod, Table, UserData, UserDataFields, UserDataMethods, Value};
use std::rc::Rc;

/// Lua handle to a scene node.
///
/// Holds a strong reference, so a node stays alive while the script keeps a
/// handle to it, attached to the tree or not.
#[derive(Clone)]
pub struct LuaSceneNode {
    pub(crate) node: NodeRef,
}

impl LuaSceneNode {
    pub fn new(node: NodeRef) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }
}

impl FromLua for LuaSceneNode {
    fn from_lua(value: Value, _lua: &Lua) -> mlua::Result<Self> {
        match value {
            Value::UserData(ud) => Ok(ud.borrow::<LuaSceneNode>()?.clone()),
            _ => Err(mlua::Error::FromLuaConversionError {
                from: value.type_name(),
                to: "LuaSceneNode".to_string(),
                message: Some("expected scene node userdata".to_string()),
            }),
        }
    }
}

impl UserData for LuaSceneNode {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("type", |_lua, this| Ok(this.node.node_type().to_string()));
        fields.add_field_method_get("id", |_lua, this| Ok(this.node.id().as_u32()));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("setProps", |lua, this, props: Table| {
            let attrs = Attributes::from_lua_table(lua, props)?;
            this.node.set_properties(&attrs);
            sync_tracking(lua, &this.node)
        });

        methods.add_method("setProp", |lua, this, (name, value): (String, Value)| {
            let value = PropValue::from_lua(lua, value)?;
            this.node.set_property(&name, &value)?;
            Ok(())
        });

        methods.add_method("addChild", |_lua, this, child: LuaSceneNode| {
            this.node.add_child(child.node);
            Ok(())
        });

        methods.add_method("removeChild", |_lua, this, child: LuaSceneNode| {
            this.node.remove_child(&child.node);
            Ok(())
        });

        methods.add_method(
            "insertChildBefore",
            |_lua, this, (child, before): (LuaSceneNode, LuaSceneNode)| {
                this.node.insert_child_before(child.node, &before.node)?;
                Ok(())
            },
        );

        methods.add_method("children", |lua, this, ()| {
            let children: Vec<LuaSceneNode> = this
                .node
                .children_snapshot()
                .into_iter()
                .map(LuaSceneNode::new)
                .collect();
            lua.create_sequence_from(children)
        });

        methods.add_method("dispose", |_lua, this, ()| {
            this.node.dispose();
            Ok(())
        });

        // Lua 5.4 calls __eq for any pair of userdata, not only scene nodes
        methods.add_meta_method(MetaMethod::Eq, |_lua, this, other: AnyUserData| {
            Ok(other
                .borrow::<LuaSceneNode>()
                .is_ok_and(|other| Rc::ptr_eq(&this.node, &other.node)))
        });

        methods.add_meta_method(MetaMethod::ToString, |_lua, this, ()| {
            Ok(format!(
                "{}({})",
                this.node.node_type(),
                this.node.id().as_u32()
            ))
        });
    }
}
