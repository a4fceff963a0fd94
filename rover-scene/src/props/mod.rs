mod container;
mod value;

pub use container::{NodeProp, PropKind, PropsContainer};
pub use value::{Attributes, PropValue};
