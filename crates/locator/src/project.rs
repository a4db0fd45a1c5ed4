use crate::code::find_first_match;
use crate::error::{LocatorError, Result};
use funcgraph_protocol::ProjectKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const HOST_JSON: &str = "host.json";

static HOST_JSON_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^host\.json$").unwrap());
static MANAGED_PROJECT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(csproj|fsproj)$").unwrap());
static ISOLATED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Microsoft\.Azure\.Functions\.Worker").unwrap());
static JVM_BUILD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(pom\.xml|build\.gradle(\.kts)?)$").unwrap());

/// Outcome of the project probe: where the project lives, its runtime
/// flavor, and the folder holding the per-function descriptors (the
/// publish output for in-process dotnet, the project folder otherwise).
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub project_folder: PathBuf,
    pub kind: ProjectKind,
    pub descriptor_folder: PathBuf,
}

/// Resolve a local path or an HTTP(S) git URL to a project folder.
///
/// A URL is shallow-cloned into a fresh temp directory whose path is
/// appended to `temp_dirs`; the analyzer creates and records temp
/// directories but never deletes them.
pub async fn resolve_project(
    project: &str,
    clone_depth: Option<u32>,
    temp_dirs: &mut Vec<PathBuf>,
) -> Result<PathBuf> {
    if !(project.starts_with("http://") || project.starts_with("https://")) {
        return Ok(PathBuf::from(project));
    }

    let checkout = tempfile::Builder::new()
        .prefix("funcgraph-clone-")
        .tempdir()?
        .keep();
    temp_dirs.push(checkout.clone());

    let mut command = Command::new("git");
    command.arg("clone");
    if let Some(depth) = clone_depth {
        command.arg("--depth").arg(depth.to_string());
    }
    command.arg(project).arg(&checkout);

    log::info!("cloning {project} into {}", checkout.display());
    let output = command.output().await?;
    if !output.status.success() {
        return Err(LocatorError::CloneFailed {
            url: project.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(checkout)
}

/// Locate the first `host.json` under `root`. Its absence is fatal for
/// the whole traversal.
pub fn find_host_json(root: &Path) -> Result<PathBuf> {
    find_first_match(root, &HOST_JSON_NAME, None)
        .map(|found| found.file_path)
        .ok_or_else(|| LocatorError::HostJsonNotFound(root.to_path_buf()))
}

/// Determine the project kind by probing, in order: isolated-process
/// marker in a managed project file, any managed project file, JVM
/// build metadata, else script-based.
///
/// For in-process dotnet with `publish` enabled, runs `dotnet publish`
/// into a recorded temp directory and returns it as the descriptor
/// folder; a failed publish is fatal.
pub async fn detect_project_kind(
    project_folder: &Path,
    publish: bool,
    temp_dirs: &mut Vec<PathBuf>,
) -> Result<ResolvedProject> {
    let resolved = |kind, descriptor_folder| ResolvedProject {
        project_folder: project_folder.to_path_buf(),
        kind,
        descriptor_folder,
    };

    if find_first_match(project_folder, &MANAGED_PROJECT_NAME, Some(&ISOLATED_MARKER)).is_some() {
        return Ok(resolved(
            ProjectKind::DotNetIsolated,
            project_folder.to_path_buf(),
        ));
    }

    if let Some(project_file) = find_first_match(project_folder, &MANAGED_PROJECT_NAME, None) {
        let descriptor_folder = if publish {
            run_dotnet_publish(&project_file.file_path, temp_dirs).await?
        } else {
            project_folder.to_path_buf()
        };
        return Ok(resolved(ProjectKind::DotNetInProcess, descriptor_folder));
    }

    if find_first_match(project_folder, &JVM_BUILD_NAME, None).is_some() {
        return Ok(resolved(ProjectKind::Java, project_folder.to_path_buf()));
    }

    Ok(resolved(ProjectKind::ScriptBased, project_folder.to_path_buf()))
}

async fn run_dotnet_publish(project_file: &Path, temp_dirs: &mut Vec<PathBuf>) -> Result<PathBuf> {
    let out_dir = tempfile::Builder::new()
        .prefix("funcgraph-publish-")
        .tempdir()?
        .keep();
    temp_dirs.push(out_dir.clone());

    log::info!(
        "publishing {} into {}",
        project_file.display(),
        out_dir.display()
    );
    let output = Command::new("dotnet")
        .arg("publish")
        .arg(project_file)
        .arg("-o")
        .arg(&out_dir)
        .arg("--nologo")
        .output()
        .await?;
    if !output.status.success() {
        return Err(LocatorError::PublishFailed {
            project: project_file.to_path_buf(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn local_path_resolves_without_temp_dirs() {
        let mut temp_dirs = Vec::new();
        let path = resolve_project("/some/project", Some(1), &mut temp_dirs)
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("/some/project"));
        assert!(temp_dirs.is_empty());
    }

    #[test]
    fn missing_host_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_host_json(dir.path()).unwrap_err();
        assert!(matches!(err, LocatorError::HostJsonNotFound(_)));
    }

    #[test]
    fn host_json_found_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/project")).unwrap();
        fs::write(dir.path().join("sub/project/host.json"), "{}").unwrap();
        let found = find_host_json(dir.path()).unwrap();
        assert!(found.ends_with("sub/project/host.json"));
    }

    #[tokio::test]
    async fn probe_order_prefers_isolated_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("app.csproj"),
            r#"<PackageReference Include="Microsoft.Azure.Functions.Worker" />"#,
        )
        .unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();

        let mut temp_dirs = Vec::new();
        let resolved = detect_project_kind(dir.path(), false, &mut temp_dirs)
            .await
            .unwrap();
        assert_eq!(resolved.kind, ProjectKind::DotNetIsolated);
        assert_eq!(resolved.descriptor_folder, dir.path());
    }

    #[tokio::test]
    async fn managed_project_without_marker_is_in_process() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("app.csproj"),
            r#"<PackageReference Include="Microsoft.NET.Sdk.Functions" />"#,
        )
        .unwrap();

        let mut temp_dirs = Vec::new();
        let resolved = detect_project_kind(dir.path(), false, &mut temp_dirs)
            .await
            .unwrap();
        assert_eq!(resolved.kind, ProjectKind::DotNetInProcess);
        // publish=false reads descriptors from the source tree
        assert_eq!(resolved.descriptor_folder, dir.path());
    }

    #[tokio::test]
    async fn jvm_build_metadata_wins_over_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build.gradle"), "plugins {}").unwrap();

        let mut temp_dirs = Vec::new();
        let resolved = detect_project_kind(dir.path(), true, &mut temp_dirs)
            .await
            .unwrap();
        assert_eq!(resolved.kind, ProjectKind::Java);
    }

    #[tokio::test]
    async fn bare_folder_is_script_based() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp_dirs = Vec::new();
        let resolved = detect_project_kind(dir.path(), true, &mut temp_dirs)
            .await
            .unwrap();
        assert_eq!(resolved.kind, ProjectKind::ScriptBased);
    }
}
