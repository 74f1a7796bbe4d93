//! Directory synchronization against a DDM server.
//!
//! A sync run walks a local directory tree, pushes every declaration JSON
//! file it finds, then applies every set file's membership list, one remote
//! call at a time. The push is purely additive: nothing is ever deleted on
//! the server, and every remote operation is idempotent, so an interrupted
//! or partially failed run can simply be re-run.

mod engine;
mod scanner;
mod set_file;

pub use engine::{Engine, ItemKind, ItemOutcome, SyncItemResult, SyncReport};
pub use scanner::ScanError;
