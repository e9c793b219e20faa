use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConvertError, Result},
    layout::ShardLayout,
    pack::SHARD_FILE_NAME,
    tensor::Dtype,
};

/// File name of the manifest written next to the shard.
pub const MANIFEST_FILE_NAME: &str = "weights_manifest.json";

/// Describes one tensor written to the shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: Dtype,
    /// Byte offset inside the shard. Implied by the write order, so it's
    /// never serialized.
    #[serde(skip)]
    pub offset: usize,
}

impl WeightSpec {
    pub fn float32(name: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype: Dtype::F32,
            offset: 0,
        }
    }

    /// Number of elements.
    ///
    /// # Errors
    /// Returns `Config` if the shape doesn't fit in `usize`.
    pub fn num_elements(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| self.too_large())
    }

    /// Size of the tensor inside the shard.
    ///
    /// # Errors
    /// Returns `Config` if the size doesn't fit in `usize`.
    pub fn byte_len(&self) -> Result<usize> {
        self.num_elements()?
            .checked_mul(self.dtype.size())
            .ok_or_else(|| self.too_large())
    }

    fn too_large(&self) -> ConvertError {
        ConvertError::Config(format!(
            "{} with shape {:?} is too large to address",
            self.name, self.shape
        ))
    }
}

/// A group of the browser runtime's `weightsManifest`: the shard files and
/// the tensors they hold, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightGroup {
    pub paths: Vec<String>,
    pub weights: Vec<WeightSpec>,
}

impl WeightGroup {
    pub fn single_shard(weights: Vec<WeightSpec>) -> Self {
        Self {
            paths: vec![SHARD_FILE_NAME.to_string()],
            weights,
        }
    }
}

/// Writes the manifest for a single-shard model into `dir`.
///
/// # Returns
/// The path of the written manifest.
pub fn write_manifest(dir: &Path, specs: &[WeightSpec]) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE_NAME);
    let manifest = [WeightGroup::single_shard(specs.to_vec())];

    let mut writer = BufWriter::new(fs::File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    writer.flush()?;
    log::debug!("wrote manifest {}", path.display());
    Ok(path)
}

/// Reads the manifest from `dir`, restoring the byte offset of every spec.
///
/// # Errors
/// Besides io and json errors, returns `Config` if the described tensors
/// don't fit in memory.
pub fn read_manifest(dir: &Path) -> Result<Vec<WeightSpec>> {
    let content = fs::read_to_string(dir.join(MANIFEST_FILE_NAME))?;
    let groups: Vec<WeightGroup> = serde_json::from_str(&content)?;

    let mut specs: Vec<WeightSpec> = groups.into_iter().flat_map(|g| g.weights).collect();
    let layout = ShardLayout::new(&specs)?;
    for (spec, range) in specs.iter_mut().zip(layout.ranges()) {
        spec.offset = range.start;
    }

    Ok(specs)
}
