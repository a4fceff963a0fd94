//! Built-in drawing node kinds.
//!
//! Each kind declares its property schema and keeps a materialized copy of
//! the resolved values that a renderer can read without touching the
//! property container.

mod group;
mod paint;
mod shapes;

pub use group::Group;
pub use paint::{Paint, PaintStyle};
pub use shapes::{Circle, CircleGeometry, Rect, RectGeometry};

use crate::node::NodeFactory;

pub fn register_builtin_kinds(factory: &mut NodeFactory) {
    factory.register(Group::TYPE, Group::boxed);
    factory.register(Rect::TYPE, Rect::boxed);
    factory.register(Circle::TYPE, Circle::boxed);
    factory.register(Paint::TYPE, Paint::boxed);
}
