pub mod items;
pub mod properties;
pub mod snapshot;

pub use items::*;
pub use properties::*;
pub use snapshot::*;
