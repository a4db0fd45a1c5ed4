//! # Funcgraph Patterns
//!
//! A fixed catalogue of text patterns recognizing the call forms that
//! link serverless functions together: activity invocations,
//! sub-orchestration starts, entity signals, external events and
//! self-continuation, plus the declaration and binding-attribute shapes
//! used to anchor code extraction.
//!
//! Each family is language-agnostic: one regex covers the C#, JS/TS and
//! Python spellings of the same call (retry overloads included), is
//! case-sensitive on the target identifier and anchored to the literal
//! name, so a partial name never matches.
//!
//! The [`CallPattern`] trait is the seam for swapping a family out for
//! a real per-language parser later without touching the edge-inference
//! algorithm.

mod bindings;
mod catalogue;

pub use bindings::{attribute_bindings, java_annotation_bindings};
pub use catalogue::{
    call_activity, call_sub_orchestrator, continues_as_new, external_event_names,
    function_name_declaration, raise_event, signal_entity, start_new_orchestration, CallPattern,
    DeclarationKind, RegexCallPattern,
};
