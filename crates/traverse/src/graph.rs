use crate::codemap::FunctionCodeMap;
use funcgraph_patterns::{
    call_activity, call_sub_orchestrator, continues_as_new, external_event_names, raise_event,
    signal_entity, start_new_orchestration, CallPattern,
};
use funcgraph_protocol::{
    FunctionInfo, FunctionsMap, SignalledBy, ACTIVITY_TRIGGER, ENTITY_TRIGGER,
    ORCHESTRATION_TRIGGER,
};
use std::collections::BTreeMap;

/// Disjoint buckets by trigger binding; first-match in the fixed order
/// orchestration, activity, entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionRole {
    Orchestrator,
    Activity,
    Entity,
    Other,
}

fn classify(info: &FunctionInfo) -> FunctionRole {
    if info.has_trigger(ORCHESTRATION_TRIGGER) {
        FunctionRole::Orchestrator
    } else if info.has_trigger(ACTIVITY_TRIGGER) {
        FunctionRole::Activity
    } else if info.has_trigger(ENTITY_TRIGGER) {
        FunctionRole::Entity
    } else {
        FunctionRole::Other
    }
}

enum Edge {
    CalledBy { target: String, caller: String },
    SignalledBy { target: String, caller: String, event: String },
    SelfContinuation { target: String },
}

/// Run the multi-pass matching over every function's code body and
/// record call/signal edges plus self-recursion flags.
///
/// Edge lists are append-only across passes; no dedup is performed, so
/// one caller can appear once per matching pass. Location fields from
/// the code lookup are copied onto the matching map entries.
pub fn map_call_graph(functions: &mut FunctionsMap, codes: &FunctionCodeMap) {
    let roles: BTreeMap<&str, FunctionRole> = functions
        .iter()
        .map(|(name, info)| (name.as_str(), classify(info)))
        .collect();
    let bucket = |role: FunctionRole| -> Vec<&str> {
        roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(name, _)| *name)
            .collect()
    };
    let orchestrators = bucket(FunctionRole::Orchestrator);
    let activities = bucket(FunctionRole::Activity);
    let entities = bucket(FunctionRole::Entity);
    let others = bucket(FunctionRole::Other);

    let mut edges: Vec<Edge> = Vec::new();

    for &orchestrator in &orchestrators {
        // Trigger functions starting this orchestration. Only the
        // callers' code matters here, so this pass runs even when the
        // orchestrator's own body was never located.
        let starter = start_new_orchestration(orchestrator);
        for &other in &others {
            if let Some(other_code) = codes.get(other) {
                if starter.matches(&other_code.code) {
                    edges.push(Edge::CalledBy {
                        target: orchestrator.to_string(),
                        caller: other.to_string(),
                    });
                }
            }
        }

        let Some(code) = codes.get(orchestrator) else {
            continue;
        };

        // Sub-orchestrations this orchestrator launches.
        for &sub in &orchestrators {
            if sub != orchestrator && call_sub_orchestrator(sub).matches(&code.code) {
                edges.push(Edge::CalledBy {
                    target: sub.to_string(),
                    caller: orchestrator.to_string(),
                });
            }
        }

        // Activities this orchestrator calls.
        for &activity in &activities {
            if call_activity(activity).matches(&code.code) {
                edges.push(Edge::CalledBy {
                    target: activity.to_string(),
                    caller: orchestrator.to_string(),
                });
            }
        }

        if continues_as_new(&code.code) {
            edges.push(Edge::SelfContinuation {
                target: orchestrator.to_string(),
            });
        }

        // Awaited external events, paired with every raiser.
        for event in external_event_names(&code.code) {
            let raiser = raise_event(&event);
            for (other, other_code) in codes {
                if other != orchestrator && raiser.matches(&other_code.code) {
                    edges.push(Edge::SignalledBy {
                        target: orchestrator.to_string(),
                        caller: other.clone(),
                        event: event.clone(),
                    });
                }
            }
        }
    }

    for &entity in &entities {
        let signaller = signal_entity(entity);
        for (other, other_code) in codes {
            if other != entity && signaller.matches(&other_code.code) {
                edges.push(Edge::CalledBy {
                    target: entity.to_string(),
                    caller: other.clone(),
                });
            }
        }
    }

    for edge in edges {
        match edge {
            Edge::CalledBy { target, caller } => {
                if let Some(info) = functions.get_mut(&target) {
                    info.is_called_by.push(caller);
                }
            }
            Edge::SignalledBy { target, caller, event } => {
                if let Some(info) = functions.get_mut(&target) {
                    info.is_signalled_by.push(SignalledBy {
                        name: caller,
                        signal_name: event,
                    });
                }
            }
            Edge::SelfContinuation { target } => {
                if let Some(info) = functions.get_mut(&target) {
                    info.is_called_by_itself = true;
                }
            }
        }
    }

    for (name, info) in functions.iter_mut() {
        if let Some(code) = codes.get(name) {
            info.file_path = Some(code.file_path.clone());
            info.source_offset = Some(code.offset);
            info.line_number = Some(code.line_number);
        }
    }
}
