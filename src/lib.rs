pub mod configs;
pub mod container;
pub mod driver;
pub mod error;
pub mod extract;
pub mod layout;
pub mod manifest;
pub mod pack;
pub mod tensor;

pub use driver::{convert_all, convert_job, JobOutcome, JobReport};
pub use error::{ConvertError, Result};
pub use extract::extract_weights;
pub use manifest::{read_manifest, write_manifest, WeightSpec};
pub use pack::{pack_weights, unpack_weights, write_weights};
pub use tensor::{Dtype, TensorData, WeightSet, WeightTensor};

/// Converts every job of `config`, reading the sources as HDF5 files.
#[cfg(feature = "hdf5")]
pub fn convert(config: &configs::ConvertConfig) -> Vec<JobReport> {
    log::info!(
        "converting {} model(s) into {}",
        config.jobs.len(),
        config.output_dir.display()
    );
    convert_all(config, container::H5Container::open)
}
