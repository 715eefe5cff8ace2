//! State management module for StaticMD
//!
//! - `document_state`: the immutable document snapshot fed to renderers
//! - `session_state`: persistence of the last snapshot between runs

mod document_state;
mod session_state;

pub use document_state::*;
pub use session_state::*;
