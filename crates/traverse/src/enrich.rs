use crate::codemap::FunctionCodeMap;
use funcgraph_patterns::attribute_bindings;
use funcgraph_protocol::{FunctionsMap, ORCHESTRATION_TRIGGER};

/// Merge attribute-declared bindings from source into the
/// descriptor-derived binding lists (dotnet kinds only).
///
/// Merge rule: a code-extracted candidate is appended only if no
/// existing binding has its type. Direction inference: an existing
/// binding without a direction takes the direction of the single
/// candidate of the same type; zero or several candidates leave it
/// unset. Running twice yields the same list as running once.
pub fn enrich_bindings(functions: &mut FunctionsMap, codes: &FunctionCodeMap) {
    for (name, info) in functions.iter_mut() {
        if info.has_trigger(ORCHESTRATION_TRIGGER) {
            continue;
        }
        let Some(code) = codes.get(name) else {
            continue;
        };
        let candidates = attribute_bindings(&code.code);
        if candidates.is_empty() {
            continue;
        }

        for existing in &mut info.bindings {
            if existing.direction.is_some() {
                continue;
            }
            let mut same_type = candidates
                .iter()
                .filter(|candidate| candidate.binding_type == existing.binding_type);
            if let (Some(single), None) = (same_type.next(), same_type.next()) {
                existing.direction = single.direction.clone();
            }
        }

        for candidate in candidates {
            let duplicate = info
                .bindings
                .iter()
                .any(|binding| binding.binding_type == candidate.binding_type);
            if !duplicate {
                info.bindings.push(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemap::FunctionCode;
    use funcgraph_protocol::{Binding, FunctionInfo};
    use pretty_assertions::assert_eq;

    fn codes_for(name: &str, body: &str) -> FunctionCodeMap {
        let mut codes = FunctionCodeMap::new();
        codes.insert(
            name.to_string(),
            FunctionCode {
                file_path: "Funcs.cs".to_string(),
                code: body.to_string(),
                offset: 0,
                line_number: 1,
            },
        );
        codes
    }

    #[test]
    fn candidates_with_new_types_are_appended() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Fn".to_string(),
            FunctionInfo::with_bindings(vec![Binding::trigger("httpTrigger")]),
        );
        let codes = codes_for(
            "Fn",
            r#"[HttpTrigger(AuthorizationLevel.Anonymous)] req, [return: Queue("out")]"#,
        );

        enrich_bindings(&mut functions, &codes);
        let types: Vec<_> = functions["Fn"]
            .bindings
            .iter()
            .map(|b| b.binding_type.as_str())
            .collect();
        assert_eq!(types, vec!["httpTrigger", "queue"]);
    }

    #[test]
    fn existing_types_are_never_duplicated() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Fn".to_string(),
            FunctionInfo::with_bindings(vec![Binding::trigger("httpTrigger")]),
        );
        let codes = codes_for("Fn", r#"[HttpTrigger(AuthorizationLevel.Anonymous)] req"#);

        enrich_bindings(&mut functions, &codes);
        assert_eq!(functions["Fn"].bindings.len(), 1);
    }

    #[test]
    fn direction_is_copied_from_a_single_candidate() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Fn".to_string(),
            FunctionInfo::with_bindings(vec![Binding::new("queueTrigger", None)]),
        );
        let codes = codes_for("Fn", r#"[QueueTrigger("items")] string message"#);

        enrich_bindings(&mut functions, &codes);
        assert_eq!(functions["Fn"].bindings[0].direction.as_deref(), Some("in"));
    }

    #[test]
    fn ambiguous_direction_stays_unset() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Fn".to_string(),
            FunctionInfo::with_bindings(vec![Binding::new("blob", None)]),
        );
        // Two blob attributes: zero or several candidates leave the
        // direction alone.
        let codes = codes_for("Fn", r#"[Blob("in/{name}")] a, [Blob("out/{name}")] b"#);

        enrich_bindings(&mut functions, &codes);
        assert_eq!(functions["Fn"].bindings[0].direction, None);
    }

    #[test]
    fn orchestrators_are_left_untouched() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Orch".to_string(),
            FunctionInfo::with_bindings(vec![Binding::trigger("orchestrationTrigger")]),
        );
        let codes = codes_for("Orch", r#"[Queue("out")] x"#);

        enrich_bindings(&mut functions, &codes);
        assert_eq!(functions["Orch"].bindings.len(), 1);
    }

    #[test]
    fn enrichment_is_idempotent() {
        let mut functions = FunctionsMap::new();
        functions.insert(
            "Fn".to_string(),
            FunctionInfo::with_bindings(vec![Binding::new("queueTrigger", None)]),
        );
        let codes = codes_for(
            "Fn",
            r#"[QueueTrigger("items")] string message, [return: Table("Log")]"#,
        );

        enrich_bindings(&mut functions, &codes);
        let once = functions.clone();
        enrich_bindings(&mut functions, &codes);
        assert_eq!(functions, once);
    }
}
