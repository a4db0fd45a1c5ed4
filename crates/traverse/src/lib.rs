//! # Funcgraph Traverse
//!
//! The traversal pipeline: from a project folder (or git URL) to a
//! [`TraversalResult`](funcgraph_protocol::TraversalResult).
//!
//! ## Pipeline
//!
//! ```text
//! Path or URL
//!     │
//!     ├──> ProjectLocator (clone, host.json, kind probe, publish)
//!     │
//!     ├──> DescriptorReader (function.json / source declarations)
//!     │      └─> initial FunctionsMap
//!     │
//!     ├──> GraphMapper (per-function code bodies + pattern passes)
//!     │      └─> isCalledBy / isSignalledBy / isCalledByItself edges
//!     │
//!     ├──> BindingEnricher (dotnet kinds: attribute bindings merged in)
//!     │
//!     └──> ProxyReader (proxies.json, registration check)
//! ```
//!
//! Fatal errors (missing host.json, clone or publish failure) abort the
//! traversal; malformed per-item descriptors are logged and skipped.

mod codemap;
mod descriptors;
mod enrich;
mod error;
mod graph;
mod proxies;
mod traverse;

pub use codemap::{collect_function_codes, FunctionCode, FunctionCodeMap};
pub use descriptors::read_functions;
pub use enrich::enrich_bindings;
pub use error::{Result, TraverseError};
pub use graph::map_call_graph;
pub use proxies::read_proxies;
pub use traverse::{traverse_function_project, TraversalOptions};
