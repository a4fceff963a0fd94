use crate::error::Result;
use crate::platform::PlatformContext;
use crate::props::{PropValue, PropsContainer};
use smartstring::alias::String as SmartString;
use std::any::Any;

/// Behaviour of a concrete node kind (group, shape, paint, ...).
///
/// The node calls `define_properties` exactly once, the first time attributes
/// reach it, and `props_changed` after every batch that changed something.
pub trait NodeKind: Any {
    /// Type tag reported by the node
    fn node_type(&self) -> &'static str;

    /// Declare the properties this kind recognizes
    fn define_properties(&self, container: &mut PropsContainer);

    /// Single-property fast path. Ignored unless a kind overrides it.
    fn set_prop(&mut self, _name: &str, _value: &PropValue) -> Result<()> {
        Ok(())
    }

    /// Resolved values changed for `changed` property names
    fn props_changed(
        &mut self,
        _props: &PropsContainer,
        _changed: &[SmartString],
        _context: &PlatformContext,
    ) {
    }

    fn as_any(&self) -> &dyn Any;
}
