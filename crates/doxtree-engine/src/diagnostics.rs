use std::fmt;

use relative_path::RelativePathBuf;
use serde::Serialize;
use thiserror::Error;

use crate::model::BrokenReason;

/// Problems found while building the model. None of them stop a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum DiagnosticKind {
    #[error("table row has {found} columns, expected {expected}; kept as text")]
    MalformedTable { expected: usize, found: usize },

    #[error("@{fence} block not closed before end of comment")]
    UnterminatedFence { fence: String },

    #[error("<dl> not closed before end of comment")]
    UnterminatedDefinitionList,

    #[error("{subject} is already documented; later documentation ignored")]
    DuplicateDocBlock { subject: String },

    #[error("group {group} already has parent {kept}; ignoring {rejected}")]
    ConflictingGroupParent {
        group: String,
        kept: String,
        rejected: String,
    },

    #[error("@addtogroup refers to unknown group {group}")]
    UnknownAddToGroup { group: String },

    #[error("unable to resolve reference to {target}: {reason}")]
    BrokenReference {
        target: String,
        reason: BrokenReason,
    },

    #[error("anchor {name} is defined more than once")]
    DuplicateAnchor { name: String },

    #[error("unbalanced group scope marker @{marker}")]
    UnbalancedGroupScope { marker: char },

    #[error("file skipped: {reason}")]
    UnparsableFile { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: Option<RelativePathBuf>,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            file: None,
            line: None,
        }
    }

    pub fn in_file(mut self, file: &RelativePathBuf) -> Self {
        self.file = Some(file.clone());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::UnparsableFile { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}: {}", self.kind),
            (Some(file), None) => write!(f, "{file}: {}", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}
