use std::collections::BTreeMap;

use super::{join, Container, Group, NodeInfo, NodeKind};
use crate::{
    error::{ConvertError, Result},
    tensor::TensorData,
};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Group(MemoryGroup),
    Dataset(TensorData),
}

/// A container held entirely in memory.
///
/// Children are kept sorted by name, the order HDF5 lists them in.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryContainer {
    name: String,
    root: MemoryGroup,
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: MemoryGroup::new("/"),
        }
    }

    /// Adds the group at `path` and every missing parent.
    ///
    /// # Panics
    /// If a node along `path` already exists as a dataset.
    pub fn with_group(mut self, path: &str) -> Self {
        self.root.group_at(path);
        self
    }

    /// Adds a dataset at `path`, creating every missing parent group.
    ///
    /// # Panics
    /// If a node along `path` already exists as a dataset.
    pub fn with_dataset(mut self, path: &str, data: impl Into<TensorData>) -> Self {
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (self.root.group_at(parent), name),
            None => (&mut self.root, path),
        };

        parent
            .children
            .insert(name.to_string(), Node::Dataset(data.into()));
        self
    }
}

impl Container for MemoryContainer {
    type Group = MemoryGroup;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn root(&self) -> Result<MemoryGroup> {
        Ok(self.root.clone())
    }
}

/// A group of a [`MemoryContainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryGroup {
    path: String,
    children: BTreeMap<String, Node>,
}

impl MemoryGroup {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            children: BTreeMap::new(),
        }
    }

    fn group_at(&mut self, path: &str) -> &mut MemoryGroup {
        let mut group = self;
        for name in path.split('/').filter(|s| !s.is_empty()) {
            let child_path = join(&group.path, name);
            let node = group
                .children
                .entry(name.to_string())
                .or_insert_with(|| Node::Group(MemoryGroup::new(child_path)));

            group = match node {
                Node::Group(g) => g,
                Node::Dataset(_) => panic!("'{name}' in '{path}' is a dataset"),
            };
        }
        group
    }

    fn collect_nodes(&self, out: &mut Vec<NodeInfo>) {
        for (name, node) in &self.children {
            let path = join(&self.path, name);
            match node {
                Node::Group(g) => {
                    out.push(NodeInfo {
                        path,
                        kind: NodeKind::Group,
                    });
                    g.collect_nodes(out);
                }
                Node::Dataset(data) => out.push(NodeInfo {
                    path,
                    kind: NodeKind::Dataset {
                        shape: data.shape().to_vec(),
                        dtype: Some(data.dtype()),
                    },
                }),
            }
        }
    }
}

impl Group for MemoryGroup {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn subgroup(&self, name: &str) -> Result<Option<Self>> {
        match self.children.get(name) {
            None => Ok(None),
            Some(Node::Group(g)) => Ok(Some(g.clone())),
            Some(Node::Dataset(_)) => Err(ConvertError::not_a(&join(&self.path, name), "group")),
        }
    }

    fn dataset(&self, name: &str) -> Result<Option<TensorData>> {
        match self.children.get(name) {
            None => Ok(None),
            Some(Node::Dataset(data)) => Ok(Some(data.clone())),
            Some(Node::Group(_)) => Err(ConvertError::not_a(&join(&self.path, name), "dataset")),
        }
    }

    fn nodes(&self) -> Result<Vec<NodeInfo>> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn container() -> MemoryContainer {
        MemoryContainer::new("actor.weights.h5")
            .with_group("optimizer")
            .with_dataset("layers/dense/vars/0", array![[1.0f32, 2.0]].into_dyn())
            .with_dataset("layers/dense/vars/1", array![0.5f64, 0.25].into_dyn())
    }

    #[test]
    fn walks_groups_and_reads_datasets() {
        let root = container().root().unwrap();
        let vars = root
            .subgroup("layers")
            .unwrap()
            .and_then(|g| g.subgroup("dense").unwrap())
            .and_then(|g| g.subgroup("vars").unwrap())
            .unwrap();

        assert_eq!(vars.path(), "layers/dense/vars");
        assert_eq!(vars.dataset("0").unwrap().unwrap().shape(), &[1, 2]);
        assert!(vars.dataset("2").unwrap().is_none());
        assert!(root.subgroup("missing").unwrap().is_none());
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let root = container().root().unwrap();
        assert!(root.dataset("layers").is_err());

        let layers = container()
            .with_dataset("layers/dense_1", array![1.0f32].into_dyn())
            .root()
            .unwrap()
            .subgroup("layers")
            .unwrap()
            .unwrap();
        assert!(layers.subgroup("dense_1").is_err());
    }

    #[test]
    fn lists_nodes_sorted_and_recursive() {
        let nodes = container().root().unwrap().nodes().unwrap();
        let paths: Vec<_> = nodes.iter().map(|n| n.path.as_str()).collect();

        assert_eq!(
            paths,
            [
                "layers",
                "layers/dense",
                "layers/dense/vars",
                "layers/dense/vars/0",
                "layers/dense/vars/1",
                "optimizer",
            ]
        );
        assert_eq!(
            nodes[4].kind,
            NodeKind::Dataset {
                shape: vec![2],
                dtype: Some(crate::tensor::Dtype::F64),
            }
        );
    }
}
