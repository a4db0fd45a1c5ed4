use funcgraph_locator::{find_first_match, offset_to_line_number};
use funcgraph_protocol::{ProjectKind, ProxiesMap, ProxyInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

pub(crate) const PROXIES_JSON: &str = "proxies.json";

static MANAGED_PROJECT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(csproj|fsproj)$").unwrap());

#[derive(Debug, Deserialize)]
struct ProxiesDescriptor {
    #[serde(default)]
    proxies: serde_json::Map<String, serde_json::Value>,
}

/// Parse the proxies descriptor, annotate each proxy with its source
/// location and, for managed projects, flag proxies whose descriptor is
/// not registered in the project file.
///
/// A missing descriptor yields an empty map; a malformed one is logged
/// and also yields an empty map, never a failed traversal.
pub async fn read_proxies(project_folder: &Path, kind: ProjectKind) -> ProxiesMap {
    let descriptor_path = project_folder.join(PROXIES_JSON);
    let raw = match tokio::fs::read_to_string(&descriptor_path).await {
        Ok(raw) => raw,
        Err(_) => return ProxiesMap::new(),
    };
    let descriptor: ProxiesDescriptor = match serde_json::from_str(&raw) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            log::warn!(
                "malformed {}: {err}; continuing without proxies",
                descriptor_path.display()
            );
            return ProxiesMap::new();
        }
    };

    // Managed projects must list proxies.json as project content for it
    // to be deployed; a literal presence check is enough here.
    let unregistered = kind.is_dotnet() && !registered_in_project_file(project_folder);

    let mut proxies = ProxiesMap::new();
    for (name, value) in descriptor.proxies {
        let fields = match value {
            serde_json::Value::Object(fields) => fields,
            other => {
                log::warn!("proxy {name}: expected an object, got {other}; keeping it empty");
                serde_json::Map::new()
            }
        };
        let source_offset = raw.find(&format!("\"{name}\":"));
        proxies.insert(
            name,
            ProxyInfo {
                descriptor: fields,
                file_path: Some(PROXIES_JSON.to_string()),
                source_offset,
                line_number: source_offset.map(|offset| offset_to_line_number(&raw, offset)),
                warning_not_registered_in_project_file: unregistered,
            },
        );
    }
    proxies
}

fn registered_in_project_file(project_folder: &Path) -> bool {
    find_first_match(project_folder, &MANAGED_PROJECT_NAME, None)
        .is_some_and(|project_file| project_file.content.contains(PROXIES_JSON))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[tokio::test]
    async fn proxies_are_annotated_with_locations() {
        let dir = tempfile::tempdir().unwrap();
        let raw = "{\n  \"proxies\": {\n    \"foo\": {\n      \"matchCondition\": { \"route\": \"/api/{*path}\" }\n    },\n    \"bar\": { \"backendUri\": \"https://example.org\" }\n  }\n}\n";
        fs::write(dir.path().join("proxies.json"), raw).unwrap();

        let proxies = read_proxies(dir.path(), ProjectKind::ScriptBased).await;
        assert_eq!(proxies.len(), 2);

        let foo = &proxies["foo"];
        let expected_offset = raw.find("\"foo\":").unwrap();
        assert_eq!(foo.source_offset, Some(expected_offset));
        let expected_line = raw[..expected_offset].matches('\n').count() + 1;
        assert_eq!(foo.line_number, Some(expected_line));
        assert_eq!(foo.file_path.as_deref(), Some("proxies.json"));
        assert!(!foo.warning_not_registered_in_project_file);
        assert!(foo.descriptor.contains_key("matchCondition"));
    }

    #[tokio::test]
    async fn malformed_descriptor_yields_an_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("proxies.json"), "{ nope").unwrap();
        let proxies = read_proxies(dir.path(), ProjectKind::ScriptBased).await;
        assert!(proxies.is_empty());
    }

    #[tokio::test]
    async fn missing_descriptor_yields_an_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let proxies = read_proxies(dir.path(), ProjectKind::ScriptBased).await;
        assert!(proxies.is_empty());
    }

    #[tokio::test]
    async fn unregistered_descriptor_flags_every_proxy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("proxies.json"),
            r#"{"proxies":{"foo":{},"bar":{}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("app.csproj"), "<Project></Project>").unwrap();

        let proxies = read_proxies(dir.path(), ProjectKind::DotNetInProcess).await;
        assert!(proxies["foo"].warning_not_registered_in_project_file);
        assert!(proxies["bar"].warning_not_registered_in_project_file);
    }

    #[tokio::test]
    async fn registered_descriptor_carries_no_warning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("proxies.json"),
            r#"{"proxies":{"foo":{}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("app.csproj"),
            r#"<ItemGroup><None Include="proxies.json" CopyToOutputDirectory="PreserveNewest" /></ItemGroup>"#,
        )
        .unwrap();

        let proxies = read_proxies(dir.path(), ProjectKind::DotNetInProcess).await;
        assert!(!proxies["foo"].warning_not_registered_in_project_file);
    }
}
