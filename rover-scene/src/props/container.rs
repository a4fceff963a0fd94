use super::value::{Attributes, PropValue};
use crate::deps::TrackedId;
use smartstring::alias::String as SmartString;
use tracing::{trace, warn};

/// How a declared property accepts its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    /// Only materialized values; tracked values are rejected
    Static,
    /// Materialized values or a tracked value resolved by the dependency manager
    Animated,
}

/// Descriptor for a property a node kind recognizes
#[derive(Debug, Clone)]
pub struct NodeProp {
    name: SmartString,
    kind: PropKind,
    default: Option<PropValue>,
}

impl NodeProp {
    pub fn new(name: &str, kind: PropKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn static_prop(name: &str) -> Self {
        Self::new(name, PropKind::Static)
    }

    pub fn animated(name: &str) -> Self {
        Self::new(name, PropKind::Animated)
    }

    pub fn with_default(mut self, value: impl Into<PropValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PropKind {
        self.kind
    }
}

struct PropSlot {
    prop: NodeProp,
    value: Option<PropValue>,
    tracked: Option<TrackedId>,
    changed: bool,
}

impl PropSlot {
    fn store(&mut self, value: &PropValue) -> bool {
        let same = self.value.as_ref().is_some_and(|v| v.eq_value(value));
        if !same {
            self.value = Some(value.clone());
            self.changed = true;
        }
        !same
    }
}

/// Per-node property storage.
///
/// Node kinds declare the names they recognize once; every attribute batch
/// after that is resolved against those declarations.
pub struct PropsContainer {
    slots: Vec<PropSlot>,
    update_count: u64,
}

impl PropsContainer {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            update_count: 0,
        }
    }

    /// Declare a property. Declaring the same name again replaces it.
    pub fn define(&mut self, prop: NodeProp) {
        let slot = PropSlot {
            value: prop.default.clone(),
            prop,
            tracked: None,
            changed: false,
        };
        if let Some(existing) = self.slot_mut(slot.prop.name()) {
            *existing = slot;
        } else {
            self.slots.push(slot);
        }
    }

    /// Resolve an attribute batch. Returns the number of properties whose value
    /// or binding changed.
    pub fn set_props(&mut self, attrs: &Attributes) -> usize {
        self.update_count += 1;
        let mut changed = 0;

        for (name, value) in attrs.iter() {
            let Some(slot) = self.slot_mut(name) else {
                trace!("Ignoring undeclared property '{}'", name);
                continue;
            };

            match value {
                PropValue::Tracked(id) => {
                    if slot.prop.kind != PropKind::Animated {
                        warn!("Property '{}' does not accept tracked values", name);
                        continue;
                    }
                    if slot.tracked != Some(*id) {
                        slot.tracked = Some(*id);
                        slot.changed = true;
                        changed += 1;
                    }
                }
                other => {
                    slot.tracked = None;
                    if slot.store(other) {
                        changed += 1;
                    }
                }
            }
        }

        changed
    }

    /// Write the resolved value of a tracked property
    pub fn set_resolved(&mut self, name: &str, value: &PropValue) -> bool {
        match self.slot_mut(name) {
            Some(slot) if slot.tracked.is_some() => slot.store(value),
            _ => false,
        }
    }

    /// Current materialized value; unset and nil values read as `None`
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.slot(name)?
            .value
            .as_ref()
            .filter(|v| !matches!(v, PropValue::Nil))
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn declared(&self) -> impl Iterator<Item = &NodeProp> {
        self.slots.iter().map(|s| &s.prop)
    }

    pub fn has_changed(&self) -> bool {
        self.slots.iter().any(|s| s.changed)
    }

    /// Names changed since the last call; clears the change flags
    pub fn take_changed(&mut self) -> Vec<SmartString> {
        self.slots
            .iter_mut()
            .filter(|s| s.changed)
            .map(|s| {
                s.changed = false;
                s.prop.name.clone()
            })
            .collect()
    }

    /// Properties currently bound to a tracked value
    pub fn tracked_bindings(&self) -> Vec<(SmartString, TrackedId)> {
        self.slots
            .iter()
            .filter_map(|s| s.tracked.map(|id| (s.prop.name.clone(), id)))
            .collect()
    }

    /// Number of attribute batches forwarded so far
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    fn slot(&self, name: &str) -> Option<&PropSlot> {
        self.slots.iter().find(|s| s.prop.name() == name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut PropSlot> {
        self.slots.iter_mut().find(|s| s.prop.name() == name)
    }
}

impl Default for PropsContainer {
    fn default() -> Self {
        Self::new()
    }
}
