pub mod errors;
pub mod item;
pub mod value_objects;

pub use errors::*;
pub use item::*;
pub use value_objects::*;
