pub mod runner;
pub mod scripts;

pub use runner::{CommandRunner, ProcessOutput, SystemRunner};
pub use scripts::{ScriptExecutor, ScriptSet, SharedExecutor};
