use std::fmt;

/// Which stage of the program a compile diagnostic belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures local to one canvas instance.
///
/// `ContextUnavailable` is fatal for the canvas and not retried.
/// `ShaderCompile` and `Link` are fatal for the current shader until its
/// source text changes; the `log` fields carry the compiler's literal
/// diagnostic so the offending shader can be debugged from the log output.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("no graphics context available: {reason}")]
    ContextUnavailable { reason: String },
    #[error("{stage} stage compile failed: {log}")]
    ShaderCompile {
        stage: ShaderStageKind,
        log: String,
    },
    #[error("program link failed: {log}")]
    Link { log: String },
}
