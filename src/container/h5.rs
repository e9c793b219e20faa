use std::path::{Path, PathBuf};

use hdf5::types::{FloatSize, IntSize, TypeDescriptor};

use super::{Container, Group, NodeInfo, NodeKind};
use crate::{
    error::{ConvertError, Result},
    tensor::{Dtype, TensorData},
};

fn h5_err(path: &str) -> impl FnOnce(hdf5::Error) -> ConvertError + '_ {
    move |e| ConvertError::Container {
        path: path.to_string(),
        msg: e.to_string(),
    }
}

fn dtype_of(descriptor: &TypeDescriptor) -> Option<Dtype> {
    match descriptor {
        TypeDescriptor::Float(FloatSize::U2) => Some(Dtype::F16),
        TypeDescriptor::Float(FloatSize::U4) => Some(Dtype::F32),
        TypeDescriptor::Float(FloatSize::U8) => Some(Dtype::F64),
        TypeDescriptor::Integer(IntSize::U1) => Some(Dtype::I8),
        TypeDescriptor::Integer(IntSize::U2) => Some(Dtype::I16),
        TypeDescriptor::Integer(IntSize::U4) => Some(Dtype::I32),
        TypeDescriptor::Integer(IntSize::U8) => Some(Dtype::I64),
        TypeDescriptor::Unsigned(IntSize::U1) => Some(Dtype::U8),
        TypeDescriptor::Unsigned(IntSize::U2) => Some(Dtype::U16),
        TypeDescriptor::Unsigned(IntSize::U4) => Some(Dtype::U32),
        TypeDescriptor::Unsigned(IntSize::U8) => Some(Dtype::U64),
        TypeDescriptor::Boolean => Some(Dtype::Bool),
        _ => None,
    }
}

/// A read-only HDF5 file, closed when dropped.
pub struct H5Container {
    path: PathBuf,
    file: hdf5::File,
}

impl H5Container {
    /// Opens the HDF5 file at `path` for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = hdf5::File::open(path).map_err(h5_err(&path.display().to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl Container for H5Container {
    type Group = H5Group;

    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn root(&self) -> Result<H5Group> {
        let name = self.name();
        self.file.group("/").map(H5Group).map_err(h5_err(&name))
    }
}

/// A group of an [`H5Container`].
pub struct H5Group(hdf5::Group);

impl H5Group {
    fn collect_nodes(&self, out: &mut Vec<NodeInfo>) -> Result<()> {
        let path = self.path();

        for group in self.0.groups().map_err(h5_err(&path))? {
            out.push(NodeInfo {
                path: group.name(),
                kind: NodeKind::Group,
            });
            H5Group(group).collect_nodes(out)?;
        }

        for dataset in self.0.datasets().map_err(h5_err(&path))? {
            let name = dataset.name();
            let descriptor = dataset
                .dtype()
                .and_then(|t| t.to_descriptor())
                .map_err(h5_err(&name))?;

            out.push(NodeInfo {
                kind: NodeKind::Dataset {
                    shape: dataset.shape(),
                    dtype: dtype_of(&descriptor),
                },
                path: name,
            });
        }

        Ok(())
    }
}

impl Group for H5Group {
    fn path(&self) -> String {
        self.0.name()
    }

    fn subgroup(&self, name: &str) -> Result<Option<Self>> {
        if !self.0.link_exists(name) {
            return Ok(None);
        }

        let path = super::join(&self.path(), name);
        self.0
            .group(name)
            .map(|g| Some(H5Group(g)))
            .map_err(h5_err(&path))
    }

    fn dataset(&self, name: &str) -> Result<Option<TensorData>> {
        if !self.0.link_exists(name) {
            return Ok(None);
        }

        let path = super::join(&self.path(), name);
        let dataset = self.0.dataset(name).map_err(h5_err(&path))?;
        let descriptor = dataset
            .dtype()
            .and_then(|t| t.to_descriptor())
            .map_err(h5_err(&path))?;

        let data = match dtype_of(&descriptor) {
            Some(Dtype::F16) => dataset.read_dyn::<half::f16>().map(TensorData::F16),
            Some(Dtype::F32) => dataset.read_dyn::<f32>().map(TensorData::F32),
            Some(Dtype::F64) => dataset.read_dyn::<f64>().map(TensorData::F64),
            Some(Dtype::I8) => dataset.read_dyn::<i8>().map(TensorData::I8),
            Some(Dtype::I16) => dataset.read_dyn::<i16>().map(TensorData::I16),
            Some(Dtype::I32) => dataset.read_dyn::<i32>().map(TensorData::I32),
            Some(Dtype::I64) => dataset.read_dyn::<i64>().map(TensorData::I64),
            Some(Dtype::U8) => dataset.read_dyn::<u8>().map(TensorData::U8),
            Some(Dtype::U16) => dataset.read_dyn::<u16>().map(TensorData::U16),
            Some(Dtype::U32) => dataset.read_dyn::<u32>().map(TensorData::U32),
            Some(Dtype::U64) => dataset.read_dyn::<u64>().map(TensorData::U64),
            Some(Dtype::Bool) => dataset.read_dyn::<bool>().map(TensorData::Bool),
            None => return Err(ConvertError::unsupported(path, descriptor)),
        };

        data.map(Some).map_err(h5_err(&path))
    }

    fn nodes(&self) -> Result<Vec<NodeInfo>> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out)?;
        Ok(out)
    }
}
