use crate::error::{Result, SceneError};
use crate::node::{NodeId, NodeRef, SceneNode};
use crate::props::PropValue;
use smartstring::alias::String as SmartString;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Identifier of a value owned by the dependency manager.
///
/// Slots are reused after disposal; the generation tells a recycled slot
/// apart from the value an old handle referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackedId {
    index: u32,
    generation: u32,
}

impl TrackedId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

struct Subscription {
    source: TrackedId,
    node_id: NodeId,
    node: Weak<SceneNode>,
    prop: SmartString,
}

#[derive(Default)]
struct TrackingState {
    values: Vec<Option<PropValue>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    subscriptions: Vec<Subscription>,
}

impl TrackingState {
    fn is_live(&self, id: TrackedId) -> bool {
        let idx = id.index as usize;
        self.generations.get(idx) == Some(&id.generation)
            && self.values.get(idx).is_some_and(|v| v.is_some())
    }

    fn value(&self, id: TrackedId) -> Result<&PropValue> {
        if !self.is_live(id) {
            return Err(SceneError::StaleTrackedValue(id.index));
        }
        self.values[id.index as usize]
            .as_ref()
            .ok_or(SceneError::StaleTrackedValue(id.index))
    }
}

/// Owns tracked (animated) values and pushes their changes into the nodes
/// whose properties are bound to them.
///
/// Subscriptions hold weak node references; a node's disposal hook drops its
/// subscriptions, so removed nodes stop receiving updates even while the
/// script still holds them.
#[derive(Clone, Default)]
pub struct DependencyManager {
    state: Rc<RefCell<TrackingState>>,
}

impl DependencyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_value(&self, value: PropValue) -> TrackedId {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.free_list.pop() {
            state.values[index as usize] = Some(value);
            TrackedId::new(index, state.generations[index as usize])
        } else {
            let index = state.values.len() as u32;
            state.values.push(Some(value));
            state.generations.push(0);
            TrackedId::new(index, 0)
        }
    }

    pub fn get(&self, id: TrackedId) -> Result<PropValue> {
        self.state.borrow().value(id).cloned()
    }

    /// Update a value and push it to bound nodes. Returns how many bindings
    /// were notified; unchanged values notify nobody.
    pub fn set_value(&self, id: TrackedId, value: PropValue) -> Result<usize> {
        let targets: Vec<(NodeRef, SmartString)> = {
            let mut state = self.state.borrow_mut();
            if state.value(id)?.eq_value(&value) {
                return Ok(0);
            }
            state.values[id.index as usize] = Some(value.clone());
            state.subscriptions.retain(|s| s.node.strong_count() > 0);
            state
                .subscriptions
                .iter()
                .filter(|s| s.source == id)
                .filter_map(|s| Some((s.node.upgrade()?, s.prop.clone())))
                .collect()
        };

        trace!("Tracked {} changed, notifying {} bindings", id.index, targets.len());
        for (node, prop) in &targets {
            node.apply_resolved(prop, &value);
        }
        Ok(targets.len())
    }

    /// Release a value slot together with every binding to it. Handles to
    /// the released value go stale, even once the slot is reused.
    pub fn dispose_value(&self, id: TrackedId) {
        let mut state = self.state.borrow_mut();
        if state.is_live(id) {
            let idx = id.index as usize;
            state.values[idx] = None;
            state.generations[idx] = state.generations[idx].wrapping_add(1);
            state.subscriptions.retain(|s| s.source != id);
            state.free_list.push(id.index);
        }
    }

    /// Bind every tracked property of `node`, resolve their current values and
    /// register the node's disposal hook to unsubscribe. Replaces earlier
    /// bindings of the same node. Bindings to disposed values are skipped; the
    /// property keeps its last resolved value. Returns the number of bindings.
    pub fn subscribe_node(&self, node: &NodeRef) -> Result<usize> {
        let bindings = node
            .props_container()
            .map(|c| c.tracked_bindings())
            .unwrap_or_default();

        let resolved: Vec<(SmartString, PropValue)> = {
            let mut state = self.state.borrow_mut();
            let node_id = node.id();
            let mut resolved = Vec::with_capacity(bindings.len());
            let mut live = Vec::with_capacity(bindings.len());
            for (prop, source) in bindings {
                match state.value(source) {
                    Ok(value) => {
                        resolved.push((prop.clone(), value.clone()));
                        live.push((prop, source));
                    }
                    Err(_) => warn!(
                        "{:?} property '{}' is bound to disposed tracked value {}",
                        node_id, prop, source.index
                    ),
                }
            }

            state.subscriptions.retain(|s| s.node_id != node_id);
            for (prop, source) in live {
                state.subscriptions.push(Subscription {
                    source,
                    node_id,
                    node: Rc::downgrade(node),
                    prop,
                });
            }
            resolved
        };

        for (prop, value) in &resolved {
            node.apply_resolved(prop, value);
        }

        let state = Rc::downgrade(&self.state);
        let node_id = node.id();
        node.set_dispose_hook(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.borrow_mut();
                let before = state.subscriptions.len();
                state.subscriptions.retain(|s| s.node_id != node_id);
                debug!(
                    "Unsubscribed {:?} from {} tracked values",
                    node_id,
                    before - state.subscriptions.len()
                );
            }
        });

        Ok(resolved.len())
    }

    /// Drop all bindings of a node. Returns how many were removed.
    pub fn unsubscribe(&self, node_id: NodeId) -> usize {
        let mut state = self.state.borrow_mut();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.node_id != node_id);
        before - state.subscriptions.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    pub fn subscribers_of(&self, id: TrackedId) -> usize {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .filter(|s| s.source == id)
            .count()
    }

    /// Number of live tracked values
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.values.len() - state.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Rect, RectGeometry};
    use crate::node::NodeFactory;
    use crate::platform::PlatformContext;
    use crate::props::Attributes;

    fn factory() -> NodeFactory {
        NodeFactory::with_builtin_kinds(PlatformContext::default())
    }

    #[test]
    fn test_create_and_reuse_slots() {
        let deps = DependencyManager::new();
        let a = deps.create_value(PropValue::Int(1));
        let b = deps.create_value(PropValue::Int(2));
        assert_eq!(deps.len(), 2);

        deps.dispose_value(a);
        assert!(matches!(deps.get(a), Err(SceneError::StaleTrackedValue(0))));

        let c = deps.create_value(PropValue::Int(3));
        assert_eq!(c.index(), a.index());
        assert_eq!(c.generation(), a.generation() + 1);
        assert_eq!(deps.get(b).unwrap().as_f64(), Some(2.0));
    }

    #[test]
    fn test_disposed_handle_stays_stale_after_reuse() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Int(1));
        deps.dispose_value(x);
        let y = deps.create_value(PropValue::Int(100));

        assert!(deps.set_value(x, PropValue::Int(42)).is_err());
        assert!(deps.get(x).is_err());
        assert_eq!(deps.get(y).unwrap().as_f64(), Some(100.0));

        // Disposing the old handle again must not free the new value
        deps.dispose_value(x);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps.get(y).unwrap().as_f64(), Some(100.0));
    }

    #[test]
    fn test_node_bound_to_disposed_value_not_rebound() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(1.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("x", x))
            .unwrap();
        deps.subscribe_node(&node).unwrap();
        deps.dispose_value(x);

        let y = deps.create_value(PropValue::Float(100.0));
        node.set_properties(&Attributes::new().with("width", 3.0));
        assert_eq!(deps.subscribe_node(&node).unwrap(), 0);

        assert_eq!(deps.subscribers_of(y), 0);
        assert_eq!(deps.set_value(y, PropValue::Float(200.0)).unwrap(), 0);
        let geometry = node.kind_as::<Rect>().unwrap().geometry();
        assert_eq!(geometry.x, 1.0);
        assert_eq!(geometry.width, 3.0);
    }

    #[test]
    fn test_subscribe_resolves_current_value() {
        let deps = DependencyManager::new();
        let width = deps.create_value(PropValue::Float(25.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("width", width))
            .unwrap();

        assert_eq!(deps.subscribe_node(&node).unwrap(), 1);
        assert_eq!(node.kind_as::<Rect>().unwrap().geometry().width, 25.0);
        assert!(node.has_dispose_hook());
    }

    #[test]
    fn test_set_value_pushes_to_nodes() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(0.0));
        let f = factory();
        let a = f.create("Rect", &Attributes::new().with("x", x)).unwrap();
        let b = f.create("Rect", &Attributes::new().with("x", x)).unwrap();
        deps.subscribe_node(&a).unwrap();
        deps.subscribe_node(&b).unwrap();

        assert_eq!(deps.set_value(x, PropValue::Float(7.0)).unwrap(), 2);
        assert_eq!(a.kind_as::<Rect>().unwrap().geometry().x, 7.0);
        assert_eq!(b.kind_as::<Rect>().unwrap().geometry().x, 7.0);

        // Same value: no notifications
        assert_eq!(deps.set_value(x, PropValue::Float(7.0)).unwrap(), 0);
    }

    #[test]
    fn test_dispose_unsubscribes() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(0.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("x", x))
            .unwrap();
        deps.subscribe_node(&node).unwrap();
        assert_eq!(deps.subscribers_of(x), 1);

        node.dispose();
        assert_eq!(deps.subscribers_of(x), 0);
        assert_eq!(deps.set_value(x, PropValue::Float(3.0)).unwrap(), 0);
        assert_eq!(node.kind_as::<Rect>().unwrap().geometry(), RectGeometry::default());
    }

    #[test]
    fn test_resubscribe_replaces_bindings() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(1.0));
        let y = deps.create_value(PropValue::Float(2.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("x", x))
            .unwrap();
        deps.subscribe_node(&node).unwrap();

        node.set_properties(&Attributes::new().with("x", 0.0).with("y", y));
        deps.subscribe_node(&node).unwrap();

        assert_eq!(deps.subscribers_of(x), 0);
        assert_eq!(deps.subscribers_of(y), 1);
        assert_eq!(deps.subscription_count(), 1);
    }

    #[test]
    fn test_dropped_node_pruned() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(1.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("x", x))
            .unwrap();
        deps.subscribe_node(&node).unwrap();
        drop(node);

        assert_eq!(deps.set_value(x, PropValue::Float(2.0)).unwrap(), 0);
        assert_eq!(deps.subscription_count(), 0);
    }

    #[test]
    fn test_subscribe_skips_disposed_value() {
        let deps = DependencyManager::new();
        let x = deps.create_value(PropValue::Float(1.0));
        let node = factory()
            .create("Rect", &Attributes::new().with("x", x))
            .unwrap();
        deps.dispose_value(x);

        assert_eq!(deps.subscribe_node(&node).unwrap(), 0);
        assert_eq!(deps.subscription_count(), 0);
        assert_eq!(node.kind_as::<Rect>().unwrap().geometry(), RectGeometry::default());
    }
}
