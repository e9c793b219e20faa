use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::{
    configs::{ConvertConfig, ModelJob},
    container::Container,
    error::{ConvertError, Result},
    extract::extract_weights,
    layout::ShardLayout,
    manifest::{write_manifest, WeightSpec},
    pack::pack_weights,
    tensor::WeightSet,
};

/// How a single job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The shard and its manifest were written.
    Converted {
        output_dir: PathBuf,
        specs: Vec<WeightSpec>,
        total_bytes: usize,
    },
    /// The job was not attempted, nothing was written.
    Skipped(ConvertError),
    /// The job was attempted and failed.
    Failed(ConvertError),
}

/// The outcome of a job, tagged with the job it belongs to.
#[derive(Debug)]
pub struct JobReport {
    pub job: ModelJob,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, JobOutcome::Converted { .. })
    }
}

/// Converts every job of `config` in order, opening containers with `open`.
///
/// A failing job never stops the following ones.
///
/// # Returns
/// One report per job, in job order.
pub fn convert_all<C, F>(config: &ConvertConfig, mut open: F) -> Vec<JobReport>
where
    C: Container,
    F: FnMut(&Path) -> Result<C>,
{
    let reports: Vec<_> = config
        .jobs
        .iter()
        .map(|job| convert_job(job, &config.output_dir, &mut open))
        .collect();

    let converted = reports.iter().filter(|r| r.is_converted()).count();
    info!("converted {converted}/{} models", reports.len());
    reports
}

/// Converts a single model into `<output_dir>/<job id>/`.
pub fn convert_job<C, F>(job: &ModelJob, output_dir: &Path, open: &mut F) -> JobReport
where
    C: Container,
    F: FnMut(&Path) -> Result<C>,
{
    info!("=== Converting {} model ===", job.id.to_uppercase());

    let outcome = if !job.source.exists() {
        let err = ConvertError::MissingSource {
            path: job.source.clone(),
        };
        warn!("{err}, skipping...");
        JobOutcome::Skipped(err)
    } else {
        match run(job, output_dir, open) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("failed to convert {}: {err}", job.id);
                JobOutcome::Failed(err)
            }
        }
    };

    JobReport {
        job: job.clone(),
        outcome,
    }
}

fn run<C, F>(job: &ModelJob, output_dir: &Path, open: &mut F) -> Result<JobOutcome>
where
    C: Container,
    F: FnMut(&Path) -> Result<C>,
{
    let weights = read_weights(&job.source, open)?;
    if weights.is_empty() {
        return Err(ConvertError::EmptyExtraction {
            path: job.source.clone(),
        });
    }

    let dir = job.output_dir(output_dir);
    let specs = pack_weights(&weights, &dir)?;
    write_manifest(&dir, &specs)?;

    let total_bytes = ShardLayout::new(&specs)?.total_bytes();
    info!("successfully converted {} model!", job.id);
    info!("weights saved to: {}", dir.display());

    Ok(JobOutcome::Converted {
        output_dir: dir,
        specs,
        total_bytes,
    })
}

/// Opens the container, extracts its weights and closes it again.
fn read_weights<C, F>(source: &Path, open: &mut F) -> Result<WeightSet>
where
    C: Container,
    F: FnMut(&Path) -> Result<C>,
{
    let container = open(source)?;
    extract_weights(&container)
}
