//! # Funcgraph Protocol
//!
//! The serializable data model produced by a project traversal.
//!
//! A traversal yields two maps keyed by name: one for functions (with
//! their declared bindings and the inferred call/signal edges) and one
//! for routing proxies. Wire names are camelCase to stay compatible
//! with the descriptor files the analyzer reads.

mod model;

pub use model::{
    Binding, FunctionInfo, FunctionsMap, ProjectKind, ProxiesMap, ProxyInfo, SignalledBy,
    TraversalResult, ACTIVITY_TRIGGER, ENTITY_TRIGGER, ORCHESTRATION_TRIGGER,
};
