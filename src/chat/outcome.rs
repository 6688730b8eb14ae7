use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    Expired,
    UnwantedExtension,
}

impl DeleteReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::UnwantedExtension => "unwanted-extension",
        }
    }
}

/// What happened to one file during cleaning or sweeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Cleaned {
        path: PathBuf,
        kept_lines: usize,
        dropped_lines: usize,
    },
    Deleted {
        path: PathBuf,
        reason: DeleteReason,
    },
    MarkedProcessed {
        from: PathBuf,
        to: PathBuf,
    },
    Kept {
        path: PathBuf,
    },
    Skipped {
        path: PathBuf,
        reason: String,
    },
}

impl FileOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cleaned {
                path,
                kept_lines,
                dropped_lines,
            } => write!(
                f,
                "cleaned {} kept={kept_lines} dropped={dropped_lines}",
                path.display()
            ),
            Self::Deleted { path, reason } => {
                write!(f, "deleted {} reason={}", path.display(), reason.as_str())
            }
            Self::MarkedProcessed { from, to } => {
                write!(f, "marked {} -> {}", from.display(), to.display())
            }
            Self::Kept { path } => write!(f, "kept {}", path.display()),
            Self::Skipped { path, reason } => {
                write!(f, "skipped {} reason={reason}", path.display())
            }
        }
    }
}
