use crate::deps::TrackedId;
use crate::lua::value::LuaTrackedValue;
use mlua::{Lua, Table, Value};
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;

const MAX_LIST_DEPTH: usize = 16;

/// A single attribute value pushed down by the reconciler
#[derive(Debug, Clone)]
pub enum PropValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(SmartString),
    List(Vec<PropValue>),
    /// Reference to a value owned by the dependency manager
    Tracked(TrackedId),
}

impl PropValue {
    /// Compare values for change detection
    pub fn eq_value(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Nil, PropValue::Nil) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (PropValue::String(a), PropValue::String(b)) => a == b,
            (PropValue::List(a), PropValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_value(y))
            }
            (PropValue::Tracked(a), PropValue::Tracked(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, PropValue::Tracked(_))
    }

    /// Numeric view; LuaJIT hands every number over as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Int(i) => Some(*i as f64),
            PropValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            PropValue::Nil => "nil".to_string(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Int(i) => i.to_string(),
            PropValue::Float(f) => f.to_string(),
            PropValue::String(s) => s.to_string(),
            PropValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_display_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            PropValue::Tracked(id) => format!("tracked({})", id.index()),
        }
    }

    pub fn to_lua(&self, lua: &Lua) -> mlua::Result<Value> {
        match self {
            PropValue::Nil => Ok(Value::Nil),
            PropValue::Bool(b) => Ok(Value::Boolean(*b)),
            PropValue::Int(i) => Ok(Value::Integer(*i)),
            PropValue::Float(f) => Ok(Value::Number(*f)),
            PropValue::String(s) => Ok(Value::String(lua.create_string(s.as_str())?)),
            PropValue::List(items) => {
                let table = lua.create_table()?;
                for (i, item) in items.iter().enumerate() {
                    table.raw_set(i + 1, item.to_lua(lua)?)?;
                }
                Ok(Value::Table(table))
            }
            PropValue::Tracked(id) => Ok(Value::UserData(
                lua.create_userdata(LuaTrackedValue::new(*id))?,
            )),
        }
    }

    pub fn from_lua(lua: &Lua, value: Value) -> mlua::Result<Self> {
        Self::from_lua_nested(lua, value, 0)
    }

    fn from_lua_nested(lua: &Lua, value: Value, depth: usize) -> mlua::Result<Self> {
        match value {
            Value::Nil => Ok(PropValue::Nil),
            Value::Boolean(b) => Ok(PropValue::Bool(b)),
            Value::Integer(i) => Ok(PropValue::Int(i)),
            Value::Number(n) => Ok(PropValue::Float(n)),
            Value::String(s) => Ok(PropValue::String(s.to_str()?.to_string().into())),
            Value::Table(t) => {
                // Also stops self-referencing tables
                if depth >= MAX_LIST_DEPTH {
                    return Err(mlua::Error::FromLuaConversionError {
                        from: "table",
                        to: "PropValue".to_string(),
                        message: Some(format!(
                            "Lists nest deeper than {} levels or contain themselves",
                            MAX_LIST_DEPTH
                        )),
                    });
                }
                let mut items = Vec::with_capacity(t.raw_len());
                for item in t.sequence_values::<Value>() {
                    items.push(PropValue::from_lua_nested(lua, item?, depth + 1)?);
                }
                Ok(PropValue::List(items))
            }
            Value::UserData(ref ud) => match ud.borrow::<LuaTrackedValue>() {
                Ok(tracked) => Ok(PropValue::Tracked(tracked.id)),
                Err(_) => Err(mlua::Error::FromLuaConversionError {
                    from: value.type_name(),
                    to: "PropValue".to_string(),
                    message: Some("Only tracked values are accepted as userdata".to_string()),
                }),
            },
            _ => Err(mlua::Error::FromLuaConversionError {
                from: value.type_name(),
                to: "PropValue".to_string(),
                message: Some("Unsupported value type for property".to_string()),
            }),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        PropValue::Int(i)
    }
}

impl From<f64> for PropValue {
    fn from(f: f64) -> Self {
        PropValue::Float(f)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.into())
    }
}

impl From<TrackedId> for PropValue {
    fn from(id: TrackedId) -> Self {
        PropValue::Tracked(id)
    }
}

/// An attribute batch as delivered by one reconciler update.
///
/// Insertion order is kept; setting a name twice replaces the earlier value.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: SmallVec<[(SmartString, PropValue); 8]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<PropValue>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.as_str() == name) {
            slot.1 = value;
        } else {
            self.entries.push((name.into(), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read string-keyed entries from a Lua table; other keys are skipped
    pub fn from_lua_table(lua: &Lua, table: Table) -> mlua::Result<Self> {
        let mut attrs = Attributes::new();
        for pair in table.pairs::<Value, Value>() {
            let (key, value) = pair?;
            let Value::String(key) = key else {
                continue;
            };
            let key = key.to_str()?;
            attrs.insert(&key, PropValue::from_lua(lua, value)?);
        }
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_equality_nan() {
        assert!(PropValue::Float(f64::NAN).eq_value(&PropValue::Float(f64::NAN)));
        assert!(!PropValue::Float(1.0).eq_value(&PropValue::Float(1.5)));
    }

    #[test]
    fn test_mixed_types_not_equal() {
        assert!(!PropValue::Int(1).eq_value(&PropValue::Float(1.0)));
        assert!(!PropValue::Nil.eq_value(&PropValue::Bool(false)));
    }

    #[test]
    fn test_list_equality() {
        let a = PropValue::List(vec![PropValue::Int(1), "x".into()]);
        let b = PropValue::List(vec![PropValue::Int(1), "x".into()]);
        let c = PropValue::List(vec![PropValue::Int(1)]);
        assert!(a.eq_value(&b));
        assert!(!a.eq_value(&c));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(PropValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(PropValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(PropValue::from("3").as_f64(), None);
    }

    #[test]
    fn test_attributes_replace_keeps_position() {
        let attrs = Attributes::new()
            .with("x", 1i64)
            .with("y", 2i64)
            .with("x", 3i64);

        let names: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(attrs.get("x").and_then(|v| v.as_f64()), Some(3.0));
    }

    #[test]
    fn test_attributes_from_lua_table() {
        let lua = Lua::new();
        let table: Table = lua
            .load(r#"return { width = 10, label = "hi", [1] = "skipped", dash = { 1, 2 } }"#)
            .eval()
            .unwrap();

        let attrs = Attributes::from_lua_table(&lua, table).unwrap();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get("width").and_then(|v| v.as_f64()), Some(10.0));
        assert_eq!(attrs.get("label").and_then(|v| v.as_str()), Some("hi"));
        match attrs.get("dash") {
            Some(PropValue::List(items)) => assert_eq!(items.len(), 2),
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_self_referencing_table_rejected() {
        let lua = Lua::new();
        let table: Table = lua
            .load("local t = {}; t[1] = t; return t")
            .eval()
            .unwrap();

        let err = PropValue::from_lua(&lua, Value::Table(table)).unwrap_err();
        assert!(matches!(err, mlua::Error::FromLuaConversionError { .. }));
    }

    #[test]
    fn test_nested_lists_within_limit() {
        let lua = Lua::new();
        let table: Table = lua.load("return { { 1, 2 }, { { 3 } } }").eval().unwrap();

        match PropValue::from_lua(&lua, Value::Table(table)).unwrap() {
            PropValue::List(items) => assert_eq!(items.len(), 2),
            other => panic!("Expected list, got {:?}", other),
        }

        let deep: Table = lua
            .load("local t = { 1 }; for _ = 1, 40 do t = { t } end; return t")
            .eval()
            .unwrap();
        assert!(PropValue::from_lua(&lua, Value::Table(deep)).is_err());
    }
}
