use crate::deps::TrackedId;
use crate::props::PropValue;
use mlua::{MetaMethod, UserData, UserDataMethods, Value};

/// Lua userdata for a tracked value: `local w = rover.scene.value(10)`,
/// read and written through `w.val`
#[derive(Clone, Copy)]
pub struct LuaTrackedValue {
    pub(crate) id: TrackedId,
}

impl LuaTrackedValue {
    pub fn new(id: TrackedId) -> Self {
        Self { id }
    }
}

impl UserData for LuaTrackedValue {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("dispose", |lua, this, ()| {
            crate::lua::helpers::get_deps(lua)?.dispose_value(this.id);
            Ok(())
        });

        methods.add_meta_method(MetaMethod::Index, |lua, this, key: String| {
            match key.as_str() {
                "val" => {
                    let deps = crate::lua::helpers::get_deps(lua)?;
                    deps.get(this.id)?.to_lua(lua)
                }
                "id" => Ok(Value::Integer(this.id.index() as i64)),
                _ => Ok(Value::Nil),
            }
        });

        methods.add_meta_method_mut(
            MetaMethod::NewIndex,
            |lua, this, (key, value): (String, Value)| {
                if key != "val" {
                    return Err(mlua::Error::RuntimeError(format!(
                        "Cannot set property '{}'",
                        key
                    )));
                }

                let value = PropValue::from_lua(lua, value)?;
                if value.is_tracked() {
                    return Err(mlua::Error::RuntimeError(
                        "A tracked value cannot hold another tracked value".into(),
                    ));
                }
                crate::lua::helpers::get_deps(lua)?.set_value(this.id, value)?;
                Ok(())
            },
        );

        methods.add_meta_method(MetaMethod::ToString, |lua, this, ()| {
            let deps = crate::lua::helpers::get_deps(lua)?;
            let shown = deps
                .get(this.id)
                .map(|v| v.to_display_string())
                .unwrap_or_else(|_| "disposed".to_string());
            Ok(format!("Tracked({})", shown))
        });
    }
}
