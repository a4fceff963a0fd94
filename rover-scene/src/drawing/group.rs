use crate::node::NodeKind;
use crate::platform::PlatformContext;
use crate::props::{NodeProp, PropValue, PropsContainer};
use smartstring::alias::String as SmartString;
use std::any::Any;

/// Container node; carries opacity and an optional 2D affine transform
#[derive(Debug, Clone)]
pub struct Group {
    opacity: f32,
    transform: Option<[f64; 6]>,
}

impl Group {
    pub const TYPE: &'static str = "Group";

    pub fn boxed(_context: &PlatformContext) -> Box<dyn NodeKind> {
        Box::new(Self {
            opacity: 1.0,
            transform: None,
        })
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// `[a, b, c, d, tx, ty]`
    pub fn transform(&self) -> Option<[f64; 6]> {
        self.transform
    }
}

fn parse_transform(value: Option<&PropValue>) -> Option<[f64; 6]> {
    let PropValue::List(items) = value? else {
        return None;
    };
    if items.len() != 6 {
        return None;
    }
    let mut matrix = [0.0; 6];
    for (slot, item) in matrix.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(matrix)
}

impl NodeKind for Group {
    fn node_type(&self) -> &'static str {
        Self::TYPE
    }

    fn define_properties(&self, container: &mut PropsContainer) {
        container.define(NodeProp::animated("opacity").with_default(1.0));
        container.define(NodeProp::static_prop("transform"));
    }

    fn props_changed(
        &mut self,
        props: &PropsContainer,
        _changed: &[SmartString],
        _context: &PlatformContext,
    ) {
        self.opacity = props.get_f64("opacity").unwrap_or(1.0).clamp(0.0, 1.0) as f32;
        self.transform = parse_transform(props.get("transform"));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
