//! Shared reading infrastructure for all resource formats

mod binary;
mod options;

pub use binary::{BinaryReader, open_resource};
pub use options::{FormatRevision, LoadOptions};
