//! File handler module for StaticMD
//!
//! Everything that touches the file system on behalf of the shell:
//! - Importing markdown sources with encoding detection
//! - Atomic writes for exports and the session file
//! - Watching a source file for the live preview

pub mod io;
pub mod watcher;

pub use io::*;
pub use watcher::*;
