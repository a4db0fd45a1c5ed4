use crate::descriptors::{FunctionDescriptor, CSHARP_SOURCE_NAME, JAVA_SOURCE_NAME, MAX_CONCURRENT};
use funcgraph_locator::{
    bracketed_block_range, find_first_match, offset_to_line_number, ResolvedProject,
};
use funcgraph_patterns::{function_name_declaration, DeclarationKind};
use funcgraph_protocol::{FunctionsMap, ProjectKind};
use std::collections::BTreeMap;
use std::path::Path;

/// A function's located source: the declaration-to-end-of-body slice
/// for managed/JVM kinds, or the whole script file for script kinds.
#[derive(Debug, Clone)]
pub struct FunctionCode {
    /// Path relative to the project folder, `/`-separated.
    pub file_path: String,
    pub code: String,
    pub offset: usize,
    pub line_number: usize,
}

pub type FunctionCodeMap = BTreeMap<String, FunctionCode>;

/// Descriptor-declared script names tried when `scriptFile` is absent.
const SCRIPT_FILE_CANDIDATES: &[&str] = &[
    "index.js",
    "index.ts",
    "index.mjs",
    "__init__.py",
    "handler.py",
    "run.ps1",
    "run.csx",
    "run.fsx",
];

const SCRIPT_EXTENSIONS: &[&str] = &["js", "ts", "mjs", "cjs", "py", "ps1", "csx", "fsx"];

/// Locate the code body of every function, fanned out as independent
/// blocking tasks (each writes a distinct map key). A function whose
/// code cannot be found simply has no entry; that is a heuristic miss,
/// not an error.
pub async fn collect_function_codes(
    resolved: &ResolvedProject,
    functions: &FunctionsMap,
) -> FunctionCodeMap {
    let names: Vec<String> = functions.keys().cloned().collect();
    let mut codes = FunctionCodeMap::new();

    for batch in names.chunks(MAX_CONCURRENT) {
        let mut tasks = Vec::with_capacity(batch.len());
        for name in batch {
            let name = name.clone();
            let resolved = resolved.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                let code = locate_function_code(&resolved, &name);
                (name, code)
            }));
        }
        for task in tasks {
            match task.await {
                Ok((name, Some(code))) => {
                    codes.insert(name, code);
                }
                Ok((name, None)) => {
                    log::debug!("no code body located for function {name}");
                }
                Err(err) => log::warn!("code lookup task failed: {err}"),
            }
        }
    }
    codes
}

/// The declaration-through-body slice of `name` inside `content`, or
/// `None` when the declaration or a balanced body is absent.
pub(crate) fn declaration_slice<'a>(
    kind: DeclarationKind,
    name: &str,
    content: &'a str,
) -> Option<&'a str> {
    let declaration = function_name_declaration(kind, name);
    let matched = declaration.find(content)?;
    let body = bracketed_block_range(content, matched.end(), '{', '}', " \t\r\n")?;
    Some(&content[matched.start()..body.end])
}

fn locate_function_code(resolved: &ResolvedProject, name: &str) -> Option<FunctionCode> {
    match resolved.kind {
        ProjectKind::ScriptBased => locate_script_code(resolved, name),
        ProjectKind::DotNetInProcess | ProjectKind::DotNetIsolated => {
            locate_declared_code(resolved, DeclarationKind::DotNet, name)
        }
        ProjectKind::Java => locate_declared_code(resolved, DeclarationKind::Java, name),
    }
}

fn locate_declared_code(
    resolved: &ResolvedProject,
    kind: DeclarationKind,
    name: &str,
) -> Option<FunctionCode> {
    let source_name = match kind {
        DeclarationKind::DotNet => &*CSHARP_SOURCE_NAME,
        DeclarationKind::Java => &*JAVA_SOURCE_NAME,
    };
    let declaration = function_name_declaration(kind, name);
    let found = find_first_match(&resolved.project_folder, source_name, Some(&declaration))?;
    let body = bracketed_block_range(
        &found.content,
        found.offset + found.length,
        '{',
        '}',
        " \t\r\n",
    )?;
    Some(FunctionCode {
        file_path: relative_path(&resolved.project_folder, &found.file_path),
        code: found.content[found.offset..body.end].to_string(),
        offset: found.offset,
        line_number: offset_to_line_number(&found.content, found.offset),
    })
}

fn locate_script_code(resolved: &ResolvedProject, name: &str) -> Option<FunctionCode> {
    let dir = resolved.descriptor_folder.join(name);

    let mut candidates = Vec::new();
    if let Ok(raw) = std::fs::read_to_string(dir.join("function.json")) {
        if let Ok(descriptor) = serde_json::from_str::<FunctionDescriptor>(&raw) {
            if let Some(script_file) = descriptor.script_file {
                candidates.push(dir.join(script_file));
            }
        }
    }
    candidates.extend(SCRIPT_FILE_CANDIDATES.iter().map(|file| dir.join(file)));

    let path = candidates
        .into_iter()
        .find(|path| path.is_file())
        .or_else(|| first_script_in_dir(&dir))?;

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("failed to read {}: {err}", path.display());
            return None;
        }
    };
    Some(FunctionCode {
        file_path: relative_path(&resolved.project_folder, &path),
        code: content,
        offset: 0,
        line_number: 1,
    })
}

fn first_script_in_dir(dir: &Path) -> Option<std::path::PathBuf> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
        })
        .collect();
    entries.sort();
    entries.into_iter().next()
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}
