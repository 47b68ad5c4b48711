//! JSON bodies returned by the `/jupyter-fs` endpoints.
//!
//! - `ExampleResponse`: `{"data"}` from get-example
//! - `CommitResponse`: `{"curdir", "hash", "error"}` from make-commit
//! - `RevertResponse`: `{"res", "error"}` from make-revert

pub mod responses;

pub use responses::*;
