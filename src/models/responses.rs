use serde::{Deserialize, Serialize};

use crate::exec::ProcessOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub data: String,
}

/// Body of `make-commit`. `hash` is the commit script's stdout as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub curdir: String,
    pub hash: String,
    pub error: String,
}

impl CommitResponse {
    pub fn new(curdir: String, output: ProcessOutput) -> Self {
        Self {
            curdir,
            hash: output.stdout,
            error: output.stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertResponse {
    pub res: String,
    pub error: String,
}

impl From<ProcessOutput> for RevertResponse {
    fn from(output: ProcessOutput) -> Self {
        Self {
            res: output.stdout,
            error: output.stderr,
        }
    }
}
