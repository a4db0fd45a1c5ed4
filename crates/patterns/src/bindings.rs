use funcgraph_protocol::Binding;
use once_cell::sync::Lazy;
use regex::Regex;

static BINDING_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(return\s*:\s*)?([A-Z][A-Za-z0-9]*)\s*[(\]]").unwrap()
});

/// Attribute names that look like bindings but are not.
const NON_BINDING_ATTRIBUTES: &[&str] = &[
    "Function",
    "FunctionName",
    "FixedDelayRetry",
    "ExponentialBackoffRetry",
    "RetryPolicy",
    "StorageAccount",
    "Singleton",
    "Deterministic",
    "Obsolete",
    "Disable",
];

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Byte offset of the body's opening brace: the first `{` outside a
/// string or char literal. Attributes only appear before it; indexing
/// expressions in the body (`data[Count]`) must not be scanned.
fn signature_end(code: &str) -> usize {
    let mut delimiter: Option<char> = None;
    for (idx, ch) in code.char_indices() {
        match delimiter {
            Some(open) => {
                if ch == open {
                    delimiter = None;
                }
            }
            None => match ch {
                '"' | '\'' => delimiter = Some(ch),
                '{' => return idx,
                _ => {}
            },
        }
    }
    code.len()
}

/// Extract declarative binding attributes (`[XxxTrigger(...)]`,
/// `[return: Xxx(...)]`, `[Xxx(...)]`) from a declaration, in order of
/// appearance. Scanning stops at the body's opening brace.
///
/// Directions: trigger attributes are "in", `return:` attributes are
/// "out"; anything else is left unset rather than guessed. The binding
/// type is the lowerCamel attribute name.
#[must_use]
pub fn attribute_bindings(code: &str) -> Vec<Binding> {
    BINDING_ATTRIBUTE
        .captures_iter(&code[..signature_end(code)])
        .filter_map(|captures| {
            let attribute = &captures[2];
            if NON_BINDING_ATTRIBUTES.contains(&attribute) {
                return None;
            }
            let is_return = captures.get(1).is_some();
            let direction = if attribute.ends_with("Trigger") {
                Some("in")
            } else if is_return {
                Some("out")
            } else {
                None
            };
            Some(Binding::new(lower_first(attribute), direction))
        })
        .collect()
}

static JAVA_BINDING_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\s*([A-Z][A-Za-z0-9]*)\s*\(").unwrap());

const NON_BINDING_ANNOTATIONS: &[&str] = &["FunctionName", "Override", "SuppressWarnings"];

/// Extract binding annotations (`@XxxTrigger(...)`, `@XxxInput(...)`,
/// `@XxxOutput(...)`) from JVM source, in order of appearance.
///
/// Trigger and `*Input` annotations are "in", `*Output` is "out",
/// anything else is left unset.
#[must_use]
pub fn java_annotation_bindings(code: &str) -> Vec<Binding> {
    JAVA_BINDING_ANNOTATION
        .captures_iter(code)
        .filter_map(|captures| {
            let annotation = &captures[1];
            if NON_BINDING_ANNOTATIONS.contains(&annotation) {
                return None;
            }
            let direction = if annotation.ends_with("Trigger") || annotation.ends_with("Input") {
                Some("in")
            } else if annotation.ends_with("Output") {
                Some("out")
            } else {
                None
            };
            Some(Binding::new(lower_first(annotation), direction))
        })
        .collect()
}
