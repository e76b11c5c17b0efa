pub mod color;
pub mod dimension;
pub mod value;

pub use color::Color;
pub use dimension::{Dimension, UnitGroup};
pub use value::{Separator, Value};
