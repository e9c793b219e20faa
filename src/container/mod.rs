//! Read access to hierarchical weight containers.
//!
//! The extractor only needs to walk groups by name and read whole datasets,
//! so a container backend implements [`Container`] and [`Group`] and nothing
//! else.

#[cfg(feature = "hdf5")]
mod h5;
mod memory;

use std::fmt;

#[cfg(feature = "hdf5")]
pub use h5::{H5Container, H5Group};
pub use memory::{MemoryContainer, MemoryGroup};

use crate::{
    error::Result,
    tensor::{Dtype, TensorData},
};

/// An opened weight container.
pub trait Container {
    type Group: Group;

    /// Human readable name of the container, used in diagnostics.
    fn name(&self) -> String;

    /// The root group.
    fn root(&self) -> Result<Self::Group>;
}

/// A group of a weight container.
pub trait Group: Sized {
    /// Absolute path of this group inside the container.
    fn path(&self) -> String;

    /// Returns the child group `name`, or `None` if there's no such link.
    ///
    /// # Errors
    /// If the link exists but isn't a group, or the container can't be read.
    fn subgroup(&self, name: &str) -> Result<Option<Self>>;

    /// Reads the whole child dataset `name`, or `None` if there's no such link.
    ///
    /// # Errors
    /// If the link exists but isn't a dataset, its element type is unsupported
    /// or the container can't be read.
    fn dataset(&self, name: &str) -> Result<Option<TensorData>>;

    /// Lists every node below this group, recursively.
    fn nodes(&self) -> Result<Vec<NodeInfo>>;
}

/// What a container node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset {
        shape: Vec<usize>,
        dtype: Option<Dtype>,
    },
}

/// A container node, as listed by [`Group::nodes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub path: String,
    pub kind: NodeKind,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Group => write!(f, "{}: group", self.path),
            NodeKind::Dataset {
                shape,
                dtype: Some(dtype),
            } => write!(f, "{}: dataset {dtype} {shape:?}", self.path),
            NodeKind::Dataset { shape, dtype: None } => {
                write!(f, "{}: dataset (unsupported type) {shape:?}", self.path)
            }
        }
    }
}

/// Joins a group path and a child name.
pub(crate) fn join(parent: &str, name: &str) -> String {
    match parent.trim_end_matches('/') {
        "" => name.to_string(),
        parent => format!("{parent}/{name}"),
    }
}
