use once_cell::sync::Lazy;
use regex::Regex;

/// A compiled predicate over raw source text. Implementations may be
/// regex-backed (the default) or real parsers per language.
pub trait CallPattern {
    fn matches(&self, code: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct RegexCallPattern {
    regex: Regex,
}

impl RegexCallPattern {
    fn new(pattern: &str) -> Self {
        // Patterns are assembled from fixed fragments plus an escaped
        // literal name, so compilation cannot fail.
        Self {
            regex: Regex::new(pattern).expect("valid call pattern"),
        }
    }
}

impl CallPattern for RegexCallPattern {
    fn matches(&self, code: &str) -> bool {
        self.regex.is_match(code)
    }
}

/// `"Name"`, `'Name'`, `` `Name` `` or `nameof(Name)`.
fn quoted(name: &str) -> String {
    let escaped = regex::escape(name);
    format!(r#"(?:["'`]{escaped}["'`]|nameof\s*\(\s*{escaped}\s*\))"#)
}

/// Invocation forms passing a literal activity name as the call target.
#[must_use]
pub fn call_activity(name: &str) -> RegexCallPattern {
    RegexCallPattern::new(&format!(
        r#"\.\s*(?:CallActivityAsync|CallActivityWithRetryAsync|callActivity(?:WithRetry)?|call_activity(?:_with_retry)?)\s*(?:<[^>]*>)?\s*\(\s*{}"#,
        quoted(name)
    ))
}

/// Invocation forms starting a child orchestration instance.
#[must_use]
pub fn call_sub_orchestrator(name: &str) -> RegexCallPattern {
    RegexCallPattern::new(&format!(
        r#"\.\s*(?:CallSubOrchestratorAsync|CallSubOrchestratorWithRetryAsync|callSubOrchestrator(?:WithRetry)?|call_sub_orchestrator(?:_with_retry)?)\s*(?:<[^>]*>)?\s*\(\s*{}"#,
        quoted(name)
    ))
}

/// Client-side calls that begin a new orchestration instance by name.
#[must_use]
pub fn start_new_orchestration(name: &str) -> RegexCallPattern {
    RegexCallPattern::new(&format!(
        r#"\.\s*(?:StartNewAsync|startNew|start_new|ScheduleNewOrchestrationInstanceAsync|scheduleNewOrchestrationInstance)\s*(?:<[^>]*>)?\s*\(\s*{}"#,
        quoted(name)
    ))
}

/// Calls sending a signal to a named stateful entity. Tolerates the
/// entity id being wrapped in an `EntityId` constructor.
#[must_use]
pub fn signal_entity(name: &str) -> RegexCallPattern {
    RegexCallPattern::new(&format!(
        r#"\.\s*(?:SignalEntityAsync|signalEntity|signal_entity)\s*(?:<[^>]*>)?\s*\(\s*(?:new\s+[\w.]*EntityId\s*\(\s*)?{}"#,
        quoted(name)
    ))
}

/// Calls raising a named external event against a running
/// orchestration. The instance id may precede the event name.
#[must_use]
pub fn raise_event(event: &str) -> RegexCallPattern {
    RegexCallPattern::new(&format!(
        r#"\.\s*(?:RaiseEventAsync|raiseEvent|raise_event)\s*\(\s*(?:[^,()]*,\s*)?{}"#,
        quoted(event)
    ))
}

static WAIT_FOR_EXTERNAL_EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:WaitForExternalEvent|waitForExternalEvent|wait_for_external_event)\s*(?:<[^>]*>)?\s*\(\s*(?:nameof\s*\(\s*|["'`])([\w.-]+)"#,
    )
    .unwrap()
});

/// Every event name awaited by an orchestrator body, in order of
/// appearance. Duplicates are kept; the caller owns dedup policy.
#[must_use]
pub fn external_event_names(code: &str) -> Vec<String> {
    WAIT_FOR_EXTERNAL_EVENT
        .captures_iter(code)
        .map(|captures| captures[1].to_string())
        .collect()
}

static CONTINUE_AS_NEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s*(?:ContinueAsNew|continueAsNew|continue_as_new)\s*\(").unwrap());

/// Presence-only check for the orchestrator restarting itself.
#[must_use]
pub fn continues_as_new(code: &str) -> bool {
    CONTINUE_AS_NEW.is_match(code)
}

/// Which declaration spelling to anchor on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    DotNet,
    Java,
}

/// The source declaration introducing `name`, consuming through the
/// method signature up to (not including) the body's opening brace, so
/// the match end is a direct anchor for bracket extraction.
///
/// For the managed form, braces inside quoted attribute arguments
/// (route templates like `Route = "orchestrators/{name}"`) do not end
/// the signature.
#[must_use]
pub fn function_name_declaration(kind: DeclarationKind, name: &str) -> Regex {
    let pattern = match kind {
        DeclarationKind::DotNet => format!(
            r#"\[\s*Function(?:Name)?\s*\(\s*{}\s*\)\s*\](?:[^{{"]|"[^"]*")*"#,
            quoted(name)
        ),
        DeclarationKind::Java => format!(
            r#"@\s*FunctionName\s*\(\s*["']{}["']\s*\)[^{{]*"#,
            regex::escape(name)
        ),
    };
    Regex::new(&pattern).expect("valid declaration pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_activity_matches_csharp_js_and_python() {
        let pattern = call_activity("ActB");
        assert!(pattern.matches(r#"await context.CallActivityAsync<string>("ActB", name);"#));
        assert!(pattern.matches(
            r#"await context.CallActivityWithRetryAsync("ActB", retryOptions, name);"#
        ));
        assert!(pattern.matches(r#"yield context.df.callActivity("ActB", input)"#));
        assert!(pattern.matches(r#"result = yield context.call_activity('ActB', payload)"#));
        assert!(pattern.matches(r#"await ctx.CallActivityAsync(nameof(ActB), name);"#));
    }

    #[test]
    fn call_activity_is_anchored_to_the_literal_name() {
        let pattern = call_activity("ActB");
        assert!(!pattern.matches(r#"await context.CallActivityAsync("ActBig", name);"#));
        assert!(!pattern.matches(r#"await context.CallActivityAsync("actB", name);"#));
        assert!(!pattern.matches(r#"var name = "ActB";"#));
    }

    #[test]
    fn sub_orchestrator_forms() {
        let pattern = call_sub_orchestrator("Child");
        assert!(pattern.matches(r#"await context.CallSubOrchestratorAsync("Child", input);"#));
        assert!(pattern.matches(r#"yield context.df.callSubOrchestratorWithRetry("Child", r, x)"#));
        assert!(pattern.matches(r#"yield context.call_sub_orchestrator('Child')"#));
        assert!(!pattern.matches(r#"await context.CallActivityAsync("Child", input);"#));
    }

    #[test]
    fn start_new_orchestration_forms() {
        let pattern = start_new_orchestration("OrchA");
        assert!(pattern.matches(r#"await starter.StartNewAsync("OrchA", null);"#));
        assert!(pattern.matches(r#"const id = await client.startNew("OrchA", undefined, input);"#));
        assert!(pattern.matches(r#"instance_id = await client.start_new('OrchA', None, payload)"#));
        assert!(pattern
            .matches(r#"await client.ScheduleNewOrchestrationInstanceAsync(nameof(OrchA));"#));
    }

    #[test]
    fn signal_entity_tolerates_entity_id_wrapper() {
        let pattern = signal_entity("Counter");
        assert!(pattern.matches(r#"await client.SignalEntityAsync(new EntityId("Counter", key), "add");"#));
        assert!(pattern.matches(r#"context.df.signalEntity(new df.EntityId("Counter", "k"), "add")"#));
        assert!(pattern.matches(r#"await client.signal_entity('Counter', 'add')"#));
        assert!(!pattern.matches(r#"await client.SignalEntityAsync(new EntityId("Counters", k));"#));
    }

    #[test]
    fn raise_event_allows_instance_id_first() {
        let pattern = raise_event("Approved");
        assert!(pattern.matches(r#"await client.RaiseEventAsync(instanceId, "Approved", true);"#));
        assert!(pattern.matches(r#"await client.raiseEvent(instanceId, "Approved")"#));
        assert!(pattern.matches(r#"await client.raise_event(instance_id, 'Approved', value)"#));
        assert!(!pattern.matches(r#"await client.RaiseEventAsync(instanceId, "Rejected");"#));
    }

    #[test]
    fn external_event_names_capture_every_match() {
        let code = r#"
            var a = await context.WaitForExternalEvent<bool>("Approved");
            const b = yield context.df.waitForExternalEvent("Rejected");
            c = yield context.wait_for_external_event('Timeout')
        "#;
        assert_eq!(
            external_event_names(code),
            vec!["Approved", "Rejected", "Timeout"]
        );
        assert!(external_event_names("no events here").is_empty());
    }

    #[test]
    fn continue_as_new_is_presence_only() {
        assert!(continues_as_new(r#"context.ContinueAsNew(nextInput);"#));
        assert!(continues_as_new(r#"context.df.continueAsNew(state)"#));
        assert!(continues_as_new(r#"context.continue_as_new(state)"#));
        assert!(!continues_as_new(r#"await context.CallActivityAsync("A");"#));
    }

    #[test]
    fn dotnet_declaration_consumes_up_to_the_body_brace() {
        let code = r#"
            [FunctionName("OrchA")]
            public static async Task RunOrchestrator(
                [OrchestrationTrigger] IDurableOrchestrationContext context)
            { await context.CallActivityAsync("ActB", null); }
        "#;
        let declaration = function_name_declaration(DeclarationKind::DotNet, "OrchA");
        let matched = declaration.find(code).unwrap();
        assert_eq!(&code[matched.end()..matched.end() + 1], "{");

        // Both attribute spellings, nameof included.
        assert!(function_name_declaration(DeclarationKind::DotNet, "Hello")
            .is_match(r#"[Function(nameof(Hello))] public void Run() { }"#));
    }

    #[test]
    fn route_templates_do_not_end_the_declaration() {
        let code = r#"
            [Function("HttpStart")]
            public static async Task<HttpResponseData> HttpStart(
                [HttpTrigger(AuthorizationLevel.Anonymous, "post",
                    Route = "orchestrators/{orchestratorName}")] HttpRequestData req)
            { return await Start(req); }
        "#;
        let declaration = function_name_declaration(DeclarationKind::DotNet, "HttpStart");
        let matched = declaration.find(code).unwrap();
        assert_eq!(&code[matched.end()..matched.end() + 1], "{");
        assert!(code[matched.end()..].starts_with("{ return await Start(req); }"));
    }

    #[test]
    fn java_declaration_form() {
        let code = r#"
            @FunctionName("HelloJava")
            public String run(@HttpTrigger(name = "req") String req) { return req; }
        "#;
        let declaration = function_name_declaration(DeclarationKind::Java, "HelloJava");
        let matched = declaration.find(code).unwrap();
        assert_eq!(&code[matched.end()..matched.end() + 1], "{");
        assert!(!function_name_declaration(DeclarationKind::Java, "Other").is_match(code));
    }
}
