//! Format registry and reader trait.

mod registry;
mod traits;

pub use registry::FormatRegistry;
pub use traits::{FormatReader, ReadOptions};
