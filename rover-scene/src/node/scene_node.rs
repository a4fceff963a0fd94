use super::kind::NodeKind;
use super::types::{DisposeHook, NodeId};
use crate::error::{Result, SceneError};
use crate::platform::PlatformContext;
use crate::props::{Attributes, PropValue, PropsContainer};
use smartstring::alias::String as SmartString;
use std::cell::{Cell, OnceCell, Ref, RefCell};
use std::rc::Rc;
use tracing::{debug, trace};

/// Shared handle to a node. The tree and the driving script may both hold one.
pub type NodeRef = Rc<SceneNode>;

/// A node in the retained scene graph.
///
/// Owns its ordered children, a lazily created property container and an
/// optional disposal hook. Disposal is explicit: dropping the last handle
/// never runs the hook, and `dispose` may run while handles are still alive.
pub struct SceneNode {
    id: NodeId,
    node_type: SmartString,
    context: Rc<PlatformContext>,
    kind: RefCell<Box<dyn NodeKind>>,
    children: RefCell<Vec<NodeRef>>,
    props: OnceCell<RefCell<PropsContainer>>,
    dispose_hook: RefCell<Option<DisposeHook>>,
    disposed: Cell<bool>,
}

impl SceneNode {
    /// Only the factory constructs nodes, so a node is never handed out
    /// before `initialize` ran.
    pub(crate) fn new(context: Rc<PlatformContext>, kind: Box<dyn NodeKind>) -> NodeRef {
        Rc::new(Self {
            id: NodeId::next(),
            node_type: kind.node_type().into(),
            context,
            kind: RefCell::new(kind),
            children: RefCell::new(Vec::new()),
            props: OnceCell::new(),
            dispose_hook: RefCell::new(None),
            disposed: Cell::new(false),
        })
    }

    /// Apply the creation attributes through the regular update path
    pub(crate) fn initialize(&self, attrs: &Attributes) {
        self.set_properties(attrs);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn context(&self) -> &Rc<PlatformContext> {
        &self.context
    }

    /// Forward an attribute batch to the property container, creating it and
    /// letting the kind declare its properties on the first call.
    pub fn set_properties(&self, attrs: &Attributes) {
        let cell = self.props.get_or_init(|| {
            let mut container = PropsContainer::new();
            self.kind.borrow().define_properties(&mut container);
            debug!(
                "Created props container for {} {:?} ({} properties)",
                self.node_type,
                self.id,
                container.declared().count()
            );
            RefCell::new(container)
        });

        let mut container = cell.borrow_mut();
        container.set_props(attrs);
        self.notify_changed(&mut container);
    }

    /// Single-property update; a no-op unless the kind handles it
    pub fn set_property(&self, name: &str, value: &PropValue) -> Result<()> {
        self.kind.borrow_mut().set_prop(name, value)
    }

    /// Store the resolved value of a tracked property. Returns true if the
    /// materialized value changed.
    pub fn apply_resolved(&self, name: &str, value: &PropValue) -> bool {
        let Some(cell) = self.props.get() else {
            return false;
        };
        let mut container = cell.borrow_mut();
        let changed = container.set_resolved(name, value);
        if changed {
            self.notify_changed(&mut container);
        }
        changed
    }

    fn notify_changed(&self, container: &mut PropsContainer) {
        let changed = container.take_changed();
        if !changed.is_empty() {
            trace!("{:?} props changed: {:?}", self.id, changed);
            self.kind
                .borrow_mut()
                .props_changed(container, &changed, &self.context);
        }
    }

    pub fn props_container(&self) -> Option<Ref<'_, PropsContainer>> {
        self.props.get().map(|cell| cell.borrow())
    }

    pub fn has_props_container(&self) -> bool {
        self.props.get().is_some()
    }

    /// Borrow the concrete kind, if it is a `T`
    pub fn kind_as<T: NodeKind>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.kind.borrow(), |kind| kind.as_any().downcast_ref::<T>()).ok()
    }

    /// Live view of the ordered children.
    ///
    /// The view borrows the child list: adding, inserting or removing
    /// children of this node while it is held panics. Use
    /// [`children_snapshot`](Self::children_snapshot) to mutate while iterating.
    pub fn children(&self) -> Ref<'_, [NodeRef]> {
        Ref::map(self.children.borrow(), |c| c.as_slice())
    }

    /// Owned copy of the ordered children
    pub fn children_snapshot(&self) -> Vec<NodeRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Append a child. Duplicates are not filtered.
    pub fn add_child(&self, child: NodeRef) {
        trace!("{:?} add child {:?}", self.id, child.id);
        self.children.borrow_mut().push(child);
    }

    /// Insert `child` right before the first occurrence of `anchor`
    pub fn insert_child_before(&self, child: NodeRef, anchor: &NodeRef) -> Result<()> {
        let mut children = self.children.borrow_mut();
        let position = children
            .iter()
            .position(|c| Rc::ptr_eq(c, anchor))
            .ok_or(SceneError::AnchorNotFound {
                parent: self.id,
                anchor: anchor.id,
            })?;

        trace!(
            "{:?} insert child {:?} at {} (before {:?})",
            self.id, child.id, position, anchor.id
        );
        children.insert(position, child);
        Ok(())
    }

    /// Remove every occurrence of `child`, then dispose it. Disposal happens
    /// even when `child` was not attached here.
    pub fn remove_child(&self, child: &NodeRef) {
        let removed = {
            let mut children = self.children.borrow_mut();
            let before = children.len();
            children.retain(|c| !Rc::ptr_eq(c, child));
            before - children.len()
        };

        trace!("{:?} removed {} entries of {:?}", self.id, removed, child.id);
        child.dispose();
    }

    /// Register the cleanup callback, replacing any previous one
    pub fn set_dispose_hook(&self, hook: impl FnOnce() + 'static) {
        *self.dispose_hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn has_dispose_hook(&self) -> bool {
        self.dispose_hook.borrow().is_some()
    }

    /// Run and clear the disposal hook. Repeated calls find no hook and do
    /// nothing. Children are not disposed.
    pub fn dispose(&self) {
        self.disposed.set(true);
        let hook = self.dispose_hook.borrow_mut().take();
        if let Some(hook) = hook {
            debug!("Disposing {} {:?}", self.node_type, self.id);
            hook();
        }
    }

    /// Whether `dispose` has been called at least once
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl Drop for SceneNode {
    fn drop(&mut self) {
        trace!("Releasing {} {:?}", self.node_type, self.id);
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id)
            .field("type", &self.node_type)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}
