use crate::node::NodeKind;
use crate::platform::PlatformContext;
use crate::props::{NodeProp, PropsContainer};
use smartstring::alias::String as SmartString;
use std::any::Any;

/// Rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Rect {
    geometry: RectGeometry,
}

impl Rect {
    pub const TYPE: &'static str = "Rect";

    pub fn boxed(_context: &PlatformContext) -> Box<dyn NodeKind> {
        Box::new(Self::default())
    }

    pub fn geometry(&self) -> RectGeometry {
        self.geometry
    }
}

impl NodeKind for Rect {
    fn node_type(&self) -> &'static str {
        Self::TYPE
    }

    fn define_properties(&self, container: &mut PropsContainer) {
        for name in ["x", "y", "width", "height"] {
            container.define(NodeProp::animated(name).with_default(0.0));
        }
    }

    fn props_changed(
        &mut self,
        props: &PropsContainer,
        _changed: &[SmartString],
        context: &PlatformContext,
    ) {
        let px = |name: &str| context.to_pixels(props.get_f64(name).unwrap_or(0.0));
        self.geometry = RectGeometry {
            x: px("x"),
            y: px("y"),
            // Negative extents collapse to empty
            width: px("width").max(0.0),
            height: px("height").max(0.0),
        };
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Circle in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CircleGeometry {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Circle {
    geometry: CircleGeometry,
}

impl Circle {
    pub const TYPE: &'static str = "Circle";

    pub fn boxed(_context: &PlatformContext) -> Box<dyn NodeKind> {
        Box::new(Self::default())
    }

    pub fn geometry(&self) -> CircleGeometry {
        self.geometry
    }
}

impl NodeKind for Circle {
    fn node_type(&self) -> &'static str {
        Self::TYPE
    }

    fn define_properties(&self, container: &mut PropsContainer) {
        container.define(NodeProp::animated("cx").with_default(0.0));
        container.define(NodeProp::animated("cy").with_default(0.0));
        container.define(NodeProp::animated("r").with_default(0.0));
    }

    fn props_changed(
        &mut self,
        props: &PropsContainer,
        _changed: &[SmartString],
        context: &PlatformContext,
    ) {
        let px = |name: &str| context.to_pixels(props.get_f64(name).unwrap_or(0.0));
        self.geometry = CircleGeometry {
            cx: px("cx"),
            cy: px("cy"),
            r: px("r").max(0.0),
        };
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
