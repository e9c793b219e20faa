use std::{
    borrow::Cow,
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use ndarray::{ArrayD, IxDyn};

use crate::{
    error::{ConvertError, Result},
    layout::{weight_order, ShardLayout},
    manifest::WeightSpec,
    tensor::{Dtype, WeightSet},
};

/// File name of the single weights shard.
pub const SHARD_FILE_NAME: &str = "group1-shard1of1.bin";

/// Writes the tensors of `weights` into `dir/group1-shard1of1.bin`.
///
/// Creates `dir` if needed and overwrites any previous shard.
///
/// # Returns
/// One spec per written tensor, in write order.
pub fn pack_weights(weights: &WeightSet, dir: &Path) -> Result<Vec<WeightSpec>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SHARD_FILE_NAME);

    let mut writer = BufWriter::new(fs::File::create(&path)?);
    let specs = write_weights(weights, &mut writer)?;
    writer.flush()?;

    let total = ShardLayout::new(&specs)?.total_bytes();
    info!("created binary weights file: {}", path.display());
    info!("total size: {total} bytes");
    Ok(specs)
}

/// Serializes the tensors of `weights` back to back as little-endian float32,
/// following the fixed slot order. Missing slots are skipped and tensors whose
/// name is not a slot are ignored.
pub fn write_weights<W: Write>(weights: &WeightSet, writer: &mut W) -> Result<Vec<WeightSpec>> {
    let mut specs = Vec::with_capacity(weights.len());
    let mut offset = 0;

    for name in weight_order() {
        let Some(tensor) = weights.get(&name) else {
            continue;
        };

        let values = tensor.data().to_f32_vec();
        writer.write_all(&le_bytes(&values))?;

        let mut spec = WeightSpec::float32(name, tensor.shape().to_vec());
        spec.offset = offset;
        info!("written {}: {:?} at offset {offset}", spec.name, spec.shape);

        offset += values.len() * 4;
        specs.push(spec);
    }

    Ok(specs)
}

/// Reads a shard produced by [`write_weights`] back into named arrays.
///
/// # Errors
/// Returns `ShapeMismatch` if the shard is shorter or longer than the specs
/// describe, or `Config` if the specs describe more bytes than fit in memory.
pub fn unpack_weights(bytes: &[u8], specs: &[WeightSpec]) -> Result<Vec<(String, ArrayD<f32>)>> {
    let layout = ShardLayout::new(specs)?;
    if layout.total_bytes() != bytes.len() {
        return Err(ConvertError::ShapeMismatch {
            name: SHARD_FILE_NAME.to_string(),
            got: bytes.len(),
            expected: layout.total_bytes(),
        });
    }

    specs
        .iter()
        .zip(layout.ranges())
        .map(|(spec, range)| -> Result<(String, ArrayD<f32>)> {
            if spec.dtype != Dtype::F32 {
                return Err(ConvertError::unsupported(&spec.name, spec.dtype));
            }

            let values: Vec<f32> = bytes[range.clone()]
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            let got = values.len() * 4;

            let array = ArrayD::from_shape_vec(IxDyn(&spec.shape), values).map_err(|_| {
                ConvertError::ShapeMismatch {
                    name: spec.name.clone(),
                    got,
                    expected: range.len(),
                }
            })?;

            Ok((spec.name.clone(), array))
        })
        .collect()
}

fn le_bytes(values: &[f32]) -> Cow<'_, [u8]> {
    if cfg!(target_endian = "little") {
        Cow::Borrowed(bytemuck::cast_slice(values))
    } else {
        Cow::Owned(values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }
}
