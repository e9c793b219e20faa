mod convert;
mod job;

pub use convert::{ConvertConfig, CONFIG_ENV, OUTPUT_DIR_ENV};
pub use job::ModelJob;
