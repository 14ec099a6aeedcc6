pub mod page_probe;

pub use page_probe::{DomSurface, PageProbe};
