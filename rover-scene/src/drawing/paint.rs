use crate::error::Result;
use crate::node::NodeKind;
use crate::platform::PlatformContext;
use crate::props::{NodeProp, PropValue, PropsContainer};
use smartstring::alias::String as SmartString;
use std::any::Any;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

impl PaintStyle {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "fill" => Some(PaintStyle::Fill),
            "stroke" => Some(PaintStyle::Stroke),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paint {
    color: SmartString,
    stroke_width: f64,
    style: PaintStyle,
}

impl Paint {
    pub const TYPE: &'static str = "Paint";

    pub fn boxed(_context: &PlatformContext) -> Box<dyn NodeKind> {
        Box::new(Self {
            color: "black".into(),
            stroke_width: 0.0,
            style: PaintStyle::Fill,
        })
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn style(&self) -> PaintStyle {
        self.style
    }
}

impl NodeKind for Paint {
    fn node_type(&self) -> &'static str {
        Self::TYPE
    }

    fn define_properties(&self, container: &mut PropsContainer) {
        container.define(NodeProp::animated("color").with_default("black"));
        container.define(NodeProp::animated("strokeWidth").with_default(0.0));
        container.define(NodeProp::static_prop("style").with_default("fill"));
    }

    /// `color` bypasses the container so per-frame color changes stay cheap
    fn set_prop(&mut self, name: &str, value: &PropValue) -> Result<()> {
        if let ("color", Some(color)) = (name, value.as_str()) {
            self.color = color.into();
        }
        Ok(())
    }

    fn props_changed(
        &mut self,
        props: &PropsContainer,
        changed: &[SmartString],
        _context: &PlatformContext,
    ) {
        for name in changed {
            match name.as_str() {
                "color" => {
                    self.color = props.get_str("color").unwrap_or("black").into();
                }
                "strokeWidth" => {
                    self.stroke_width = props.get_f64("strokeWidth").unwrap_or(0.0).max(0.0);
                }
                "style" => {
                    let raw = props.get_str("style").unwrap_or("fill");
                    self.style = PaintStyle::parse(raw).unwrap_or_else(|| {
                        warn!("Unknown paint style '{}', using fill", raw);
                        PaintStyle::Fill
                    });
                }
                _ => {}
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeFactory;
    use crate::props::Attributes;

    #[test]
    fn test_paint_from_attributes() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let node = factory
            .create(
                "Paint",
                &Attributes::new()
                    .with("color", "red")
                    .with("strokeWidth", 2.0)
                    .with("style", "stroke"),
            )
            .unwrap();

        let paint = node.kind_as::<Paint>().unwrap();
        assert_eq!(paint.color(), "red");
        assert_eq!(paint.stroke_width(), 2.0);
        assert_eq!(paint.style(), PaintStyle::Stroke);
    }

    #[test]
    fn test_unknown_style_falls_back() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let node = factory
            .create("Paint", &Attributes::new().with("style", "dotted"))
            .unwrap();
        assert_eq!(node.kind_as::<Paint>().unwrap().style(), PaintStyle::Fill);
    }

    #[test]
    fn test_set_property_fast_path() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let node = factory.create("Paint", &Attributes::new()).unwrap();

        node.set_property("color", &PropValue::from("blue")).unwrap();
        assert_eq!(node.kind_as::<Paint>().unwrap().color(), "blue");
        // The container is not involved
        assert_eq!(node.props_container().unwrap().get_str("color"), Some("black"));
    }

    #[test]
    fn test_cleared_color_falls_back_to_black() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let node = factory
            .create("Paint", &Attributes::new().with("color", "red"))
            .unwrap();
        assert_eq!(node.kind_as::<Paint>().unwrap().color(), "red");

        node.set_properties(&Attributes::new().with("color", PropValue::Nil));
        assert_eq!(node.kind_as::<Paint>().unwrap().color(), "black");
    }
}
