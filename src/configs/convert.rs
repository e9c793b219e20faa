use std::{
    collections::HashSet,
    env, fs,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::job::ModelJob;
use crate::error::{ConvertError, Result};

/// Environment variable holding the path of a JSON config file.
pub const CONFIG_ENV: &str = "CONVERT_CONFIG";

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";

const DEFAULT_OUTPUT_DIR: &str = "public/models";
const DEFAULT_SOURCE_DIR: &str = "models";

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// Where the models live and where their shards go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub jobs: Vec<ModelJob>,
}

impl Default for ConvertConfig {
    /// The DDPG, TD3 and SAC actors.
    fn default() -> Self {
        let source = Path::new(DEFAULT_SOURCE_DIR);
        Self {
            output_dir: default_output_dir(),
            jobs: vec![
                ModelJob::new("ddpg", source.join("best_actor_ddpg.weights.h5")),
                ModelJob::new("td3", source.join("best_actor.weights.h5")),
                ModelJob::new("sac", source.join("best_actor_sac.weights.h5")),
            ],
        }
    }
}

impl ConvertConfig {
    pub fn new(output_dir: impl Into<PathBuf>, jobs: Vec<ModelJob>) -> Self {
        Self {
            output_dir: output_dir.into(),
            jobs,
        }
    }

    /// Parses and validates a config from its JSON representation.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Builds the config from the environment.
    ///
    /// Reads the file named by `CONVERT_CONFIG` if set, otherwise uses the
    /// default jobs. `OUTPUT_DIR` overrides the output directory either way.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(dir) = env::var_os(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that every job id is a unique, plain directory name.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.jobs.len());

        for job in &self.jobs {
            let mut components = Path::new(&job.id).components();
            let plain = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );

            if !plain {
                return Err(ConvertError::Config(format!(
                    "job id '{}' must be a single directory name",
                    job.id
                )));
            }

            if !seen.insert(job.id.as_str()) {
                return Err(ConvertError::Config(format!("duplicated job id '{}'", job.id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_the_three_actors() {
        let config = ConvertConfig::default();
        let ids: Vec<_> = config.jobs.iter().map(|j| j.id.as_str()).collect();

        assert_eq!(ids, ["ddpg", "td3", "sac"]);
        assert_eq!(config.output_dir, PathBuf::from("public/models"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_json() {
        let config = ConvertConfig::from_json_str(
            r#"{
                "output_dir": "out",
                "jobs": [
                    { "id": "ddpg", "source": "runs/ddpg/actor.weights.h5" },
                    { "id": "sac", "source": "runs/sac/actor.weights.h5" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(
            config.jobs[1],
            ModelJob::new("sac", "runs/sac/actor.weights.h5")
        );
    }

    #[test]
    fn output_dir_defaults_when_missing() {
        let config = ConvertConfig::from_json_str(r#"{ "jobs": [] }"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("public/models"));
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ConvertConfig::from_json_str(r#"{ "output_dir": "out" }"#).unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn rejects_bad_job_ids() {
        for id in ["", "..", "a/b", "/abs"] {
            let config = ConvertConfig::new("out", vec![ModelJob::new(id, "x.h5")]);
            assert!(
                matches!(config.validate(), Err(ConvertError::Config(_))),
                "'{id}' was accepted"
            );
        }
    }

    #[test]
    fn rejects_duplicated_ids() {
        let config = ConvertConfig::new(
            "out",
            vec![ModelJob::new("td3", "a.h5"), ModelJob::new("td3", "b.h5")],
        );
        assert!(matches!(config.validate(), Err(ConvertError::Config(_))));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let err = ConvertConfig::from_json_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
