use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Inputs ──
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse {input:?} as a boolean: {value:?}")]
    InvalidBool { input: String, value: String },

    // ── App spec ──
    #[error("failed to read app spec from {path}")]
    SpecRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse app spec")]
    SpecParse { source: serde_yaml::Error },

    #[error("component name {name:?} is used more than once")]
    DuplicateComponent { name: String },

    #[error("component has more than one source: {}", kinds.join(", "))]
    MultipleSources { kinds: Vec<&'static str> },

    // ── Image overrides ──
    #[error("failed to parse image overrides")]
    ImageOverridesParse { source: serde_json::Error },

    #[error("image overrides name unknown components: {}", names.join(", "))]
    UnmatchedImageOverrides { names: Vec<String> },

    // ── GitHub Actions ──
    #[error("failed to read GitHub event payload from {path}")]
    EventRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse GitHub event payload at {path}")]
    EventParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed repository {0:?}; expected owner/name")]
    MalformedRepository(String),

    #[error("event payload has no pull_request number; is this a pull request event?")]
    MissingPullRequest,

    #[error("failed to write output {name:?}")]
    OutputWrite {
        name: String,
        source: std::io::Error,
    },
}
