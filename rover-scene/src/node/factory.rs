use super::kind::NodeKind;
use super::scene_node::{NodeRef, SceneNode};
use crate::error::{Result, SceneError};
use crate::platform::PlatformContext;
use crate::props::Attributes;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Constructor for a registered node kind
pub type NodeCtor = fn(&PlatformContext) -> Box<dyn NodeKind>;

/// Creates nodes bound to one platform context.
///
/// Construction and the initial attribute pass happen in one call, so callers
/// only ever see initialized nodes.
pub struct NodeFactory {
    context: Rc<PlatformContext>,
    ctors: HashMap<SmartString, NodeCtor>,
}

impl NodeFactory {
    pub fn new(context: PlatformContext) -> Self {
        Self {
            context: Rc::new(context),
            ctors: HashMap::new(),
        }
    }

    /// Factory with the drawing kinds (`Group`, `Rect`, `Circle`, `Paint`) registered
    pub fn with_builtin_kinds(context: PlatformContext) -> Self {
        let mut factory = Self::new(context);
        crate::drawing::register_builtin_kinds(&mut factory);
        factory
    }

    pub fn context(&self) -> &Rc<PlatformContext> {
        &self.context
    }

    /// Register a constructor under `node_type`, returning the one it replaced
    pub fn register(&mut self, node_type: &str, ctor: NodeCtor) -> Option<NodeCtor> {
        self.ctors.insert(node_type.into(), ctor)
    }

    /// Registered type tags, sorted
    pub fn node_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.ctors.keys().map(|k| k.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Create and initialize a node of a registered type
    pub fn create(&self, node_type: &str, attrs: &Attributes) -> Result<NodeRef> {
        let ctor = self
            .ctors
            .get(node_type)
            .ok_or_else(|| SceneError::UnknownNodeType(node_type.to_string()))?;
        Ok(self.create_kind(ctor(&self.context), attrs))
    }

    /// Create and initialize a node for a kind that is not in the table
    pub fn create_kind(&self, kind: Box<dyn NodeKind>, attrs: &Attributes) -> NodeRef {
        let node = SceneNode::new(self.context.clone(), kind);
        node.initialize(attrs);
        debug!(
            "Created {} {:?} with {} attributes",
            node.node_type(),
            node.id(),
            attrs.len()
        );
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RenderTarget;

    #[test]
    fn test_builtin_types_registered() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        assert_eq!(factory.node_types(), vec!["Circle", "Group", "Paint", "Rect"]);
    }

    #[test]
    fn test_create_applies_initial_attributes() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let rect = factory
            .create("Rect", &Attributes::new().with("width", 40.0))
            .unwrap();

        assert_eq!(rect.node_type(), "Rect");
        let props = rect.props_container().unwrap();
        assert_eq!(props.update_count(), 1);
        assert_eq!(props.get_f64("width"), Some(40.0));
    }

    #[test]
    fn test_create_without_attributes_still_initializes() {
        let factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let group = factory.create("Group", &Attributes::new()).unwrap();
        assert!(group.has_props_container());
    }

    #[test]
    fn test_unknown_type() {
        let factory = NodeFactory::new(PlatformContext::default());
        let err = factory.create("Blur", &Attributes::new()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownNodeType(t) if t == "Blur"));
    }

    #[test]
    fn test_nodes_share_context() {
        let ctx = PlatformContext::new(RenderTarget::Headless).with_pixel_density(3.0);
        let factory = NodeFactory::with_builtin_kinds(ctx);
        let a = factory.create("Group", &Attributes::new()).unwrap();
        let b = factory.create("Rect", &Attributes::new()).unwrap();

        assert!(Rc::ptr_eq(a.context(), b.context()));
        assert_eq!(a.context().pixel_density(), 3.0);
    }

    #[test]
    fn test_register_replaces() {
        let mut factory = NodeFactory::with_builtin_kinds(PlatformContext::default());
        let previous = factory.register("Rect", crate::drawing::Circle::boxed);
        assert!(previous.is_some());

        let node = factory.create("Rect", &Attributes::new()).unwrap();
        assert_eq!(node.node_type(), "Circle");
    }
}
