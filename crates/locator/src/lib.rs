//! # Funcgraph Locator
//!
//! Filesystem primitives for the traversal.
//!
//! ## Pipeline position
//!
//! ```text
//! Path or git URL
//!     │
//!     ├──> Project resolution (clone, host.json discovery)
//!     │      └─> project folder + ProjectKind
//!     │
//!     └──> Code location (first-match file search,
//!            bracket-balanced block extraction, offset -> line)
//! ```
//!
//! Absence of a code match is never an error at this layer; callers
//! decide what is fatal.

mod code;
mod error;
mod project;

pub use code::{
    bracketed_block_range, extract_bracketed_block, find_all_matches, find_first_match,
    offset_to_line_number, FileMatch,
};
pub use error::{LocatorError, Result};
pub use project::{
    detect_project_kind, find_host_json, resolve_project, ResolvedProject, HOST_JSON,
};
