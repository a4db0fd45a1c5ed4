use crate::codemap::collect_function_codes;
use crate::descriptors::read_functions;
use crate::enrich::enrich_bindings;
use crate::error::Result;
use crate::graph::map_call_graph;
use crate::proxies::read_proxies;
use funcgraph_locator::{detect_project_kind, find_host_json, resolve_project};
use funcgraph_protocol::TraversalResult;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Run `dotnet publish` for in-process projects and read the
    /// published descriptors. With `false`, descriptors come from the
    /// source tree (declaration scan fallback) and no toolchain is
    /// required.
    pub publish: bool,
    /// `--depth` for remote clones; `None` clones full history.
    pub clone_depth: Option<u32>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            publish: true,
            clone_depth: Some(1),
        }
    }
}

/// Analyze the project at `project` (a local path or an HTTP(S) git
/// URL) and return its functions map and proxies map.
///
/// Temp directories created for clones and publish output are listed in
/// the result; cleaning them up is the caller's responsibility.
pub async fn traverse_function_project(
    project: &str,
    options: &TraversalOptions,
) -> Result<TraversalResult> {
    let mut temp_dirs: Vec<PathBuf> = Vec::new();

    let root = resolve_project(project, options.clone_depth, &mut temp_dirs).await?;
    let host_json = find_host_json(&root)?;
    let project_folder = host_json.parent().unwrap_or(&root).to_path_buf();

    let resolved = detect_project_kind(&project_folder, options.publish, &mut temp_dirs).await?;
    log::info!(
        "traversing {} ({:?})",
        resolved.project_folder.display(),
        resolved.kind
    );

    let mut functions = read_functions(&resolved).await?;
    let codes = collect_function_codes(&resolved, &functions).await;
    log::info!(
        "located code for {} of {} function(s)",
        codes.len(),
        functions.len()
    );

    map_call_graph(&mut functions, &codes);
    if resolved.kind.is_dotnet() {
        enrich_bindings(&mut functions, &codes);
    }

    let proxies = read_proxies(&resolved.project_folder, resolved.kind).await;
    if !proxies.is_empty() {
        log::info!("found {} proxy(ies)", proxies.len());
    }

    Ok(TraversalResult {
        functions,
        proxies,
        temp_directories: temp_dirs,
        project_folder: resolved.project_folder,
    })
}
