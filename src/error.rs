use std::{error::Error, fmt, io, path::PathBuf};

/// The result type used in the entire conversion pipeline.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// All errors that can occur while converting a weight container.
#[derive(Debug)]
pub enum ConvertError {
    /// The source container does not exist on disk.
    MissingSource { path: PathBuf },
    /// The container could not be opened or traversed.
    Container { path: String, msg: String },
    /// A group required by the layout is absent.
    MissingGroup { path: String, group: &'static str },
    /// A dataset stores an element type that can't be cast to float32.
    UnsupportedDtype { name: String, dtype: String },
    /// Traversal succeeded but no known tensor was found.
    EmptyExtraction { path: PathBuf },
    /// A packed shard doesn't match the specs used to read it back.
    ShapeMismatch {
        name: String,
        got: usize,
        expected: usize,
    },
    /// The conversion configuration is invalid.
    Config(String),
    Json(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource { path } => write!(f, "{} not found", path.display()),
            Self::Container { path, msg } => write!(f, "container error at '{path}': {msg}"),
            Self::MissingGroup { path, group } => {
                write!(f, "missing group '{group}' under '{path}'")
            }
            Self::UnsupportedDtype { name, dtype } => {
                write!(f, "dataset '{name}' has unsupported element type {dtype}")
            }
            Self::EmptyExtraction { path } => {
                write!(f, "no weights could be extracted from {}", path.display())
            }
            Self::ShapeMismatch {
                name,
                got,
                expected,
            } => write!(
                f,
                "size mismatch for {name}: got {got} bytes, expected {expected}"
            ),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConvertError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl ConvertError {
    pub(crate) fn unsupported(name: impl Into<String>, dtype: impl fmt::Debug) -> Self {
        Self::UnsupportedDtype {
            name: name.into(),
            dtype: format!("{dtype:?}"),
        }
    }

    pub(crate) fn not_a(path: &str, expected: &str) -> Self {
        Self::Container {
            path: path.to_string(),
            msg: format!("expected a {expected}"),
        }
    }
}

