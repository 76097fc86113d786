mod entity;
mod index;
mod key;
mod property;
mod relationship;

pub use entity::*;
pub use index::*;
pub use key::*;
pub use property::*;
pub use relationship::*;
