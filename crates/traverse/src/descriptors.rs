use crate::error::Result;
use funcgraph_locator::{find_all_matches, ResolvedProject};
use funcgraph_patterns::{
    attribute_bindings, function_name_declaration, java_annotation_bindings, DeclarationKind,
};
use funcgraph_protocol::{FunctionInfo, FunctionsMap, ProjectKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Fan-out width for per-item I/O, matching the rest of the pipeline.
pub(crate) const MAX_CONCURRENT: usize = 16;

pub(crate) static CSHARP_SOURCE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.cs$").unwrap());
pub(crate) static JAVA_SOURCE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.java$").unwrap());

static DOTNET_DECLARED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[\s*Function(?:Name)?\s*\(\s*(?:nameof\s*\(\s*|["'`])([\w.-]+)"#).unwrap()
});
static JAVA_DECLARED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@\s*FunctionName\s*\(\s*["']([\w.-]+)"#).unwrap());

/// The part of `function.json` the analyzer interprets.
#[derive(Debug, Deserialize)]
pub(crate) struct FunctionDescriptor {
    #[serde(default)]
    pub bindings: Vec<funcgraph_protocol::Binding>,
    #[serde(default, rename = "scriptFile")]
    pub script_file: Option<String>,
}

/// Produce the initial FunctionsMap for the resolved project.
///
/// Script-based and published in-process projects read `function.json`
/// descriptors; isolated-process and JVM projects are scanned for
/// source declarations. Malformed descriptors are logged and skipped.
pub async fn read_functions(resolved: &ResolvedProject) -> Result<FunctionsMap> {
    let functions = match resolved.kind {
        ProjectKind::ScriptBased => read_descriptor_folder(&resolved.descriptor_folder).await?,
        ProjectKind::DotNetInProcess => {
            let functions = read_descriptor_folder(&resolved.descriptor_folder).await?;
            if functions.is_empty() {
                // No published output (publish skipped or empty); fall
                // back to the source declaration scan.
                log::info!("no function.json descriptors found; scanning source declarations");
                scan_source_declarations(&resolved.project_folder, DeclarationKind::DotNet).await?
            } else {
                functions
            }
        }
        ProjectKind::DotNetIsolated => {
            scan_source_declarations(&resolved.project_folder, DeclarationKind::DotNet).await?
        }
        ProjectKind::Java => {
            scan_source_declarations(&resolved.project_folder, DeclarationKind::Java).await?
        }
    };
    log::info!("found {} function(s)", functions.len());
    Ok(functions)
}

async fn read_descriptor_folder(folder: &Path) -> Result<FunctionsMap> {
    let mut dirs = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }

    let mut functions = FunctionsMap::new();
    for batch in dirs.chunks(MAX_CONCURRENT) {
        let mut tasks = Vec::with_capacity(batch.len());
        for dir in batch {
            let dir = dir.clone();
            tasks.push(tokio::spawn(async move {
                read_function_descriptor(dir).await
            }));
        }
        for task in tasks {
            if let Some((name, info)) = task.await? {
                functions.insert(name, info);
            }
        }
    }
    Ok(functions)
}

async fn read_function_descriptor(dir: PathBuf) -> Option<(String, FunctionInfo)> {
    let raw = tokio::fs::read_to_string(dir.join("function.json")).await.ok()?;
    let name = dir.file_name()?.to_str()?.to_string();
    match serde_json::from_str::<FunctionDescriptor>(&raw) {
        Ok(descriptor) => Some((name, FunctionInfo::with_bindings(descriptor.bindings))),
        Err(err) => {
            log::warn!("skipping function {name}: malformed function.json: {err}");
            None
        }
    }
}

async fn scan_source_declarations(
    root: &Path,
    kind: DeclarationKind,
) -> Result<FunctionsMap> {
    let root = root.to_path_buf();
    let functions =
        tokio::task::spawn_blocking(move || scan_source_declarations_sync(&root, kind)).await?;
    Ok(functions)
}

fn scan_source_declarations_sync(root: &Path, kind: DeclarationKind) -> FunctionsMap {
    let (source_name, declared_name): (&Regex, &Regex) = match kind {
        DeclarationKind::DotNet => (&CSHARP_SOURCE_NAME, &DOTNET_DECLARED_NAME),
        DeclarationKind::Java => (&JAVA_SOURCE_NAME, &JAVA_DECLARED_NAME),
    };

    let mut functions = FunctionsMap::new();
    for file in find_all_matches(root, source_name, Some(declared_name)) {
        for captures in declared_name.captures_iter(&file.content) {
            let name = captures[1].to_string();
            if functions.contains_key(&name) {
                continue;
            }
            let bindings = declaration_bindings(kind, &name, &file.content);
            functions.insert(name, FunctionInfo::with_bindings(bindings));
        }
    }
    functions
}

/// Bindings declared on a function's signature: carve the declaration
/// through the end of its body and run the attribute/annotation
/// extractor over that slice.
fn declaration_bindings(
    kind: DeclarationKind,
    name: &str,
    content: &str,
) -> Vec<funcgraph_protocol::Binding> {
    let Some(code) = crate::codemap::declaration_slice(kind, name, content) else {
        log::debug!("no extractable body for declared function {name}");
        return Vec::new();
    };
    match kind {
        DeclarationKind::DotNet => attribute_bindings(code),
        DeclarationKind::Java => java_annotation_bindings(code),
    }
}
