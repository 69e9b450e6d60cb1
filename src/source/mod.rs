//! Container readers feeding the extractor.

mod container;

pub use container::ContainerSource;
