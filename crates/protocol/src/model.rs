use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const ORCHESTRATION_TRIGGER: &str = "orchestrationTrigger";
pub const ACTIVITY_TRIGGER: &str = "activityTrigger";
pub const ENTITY_TRIGGER: &str = "entityTrigger";

/// A declarative input/output connection point of a function.
///
/// Only `type` and `direction` are interpreted; everything else a
/// descriptor declares rides along in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub binding_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Binding {
    pub fn new(binding_type: impl Into<String>, direction: Option<&str>) -> Self {
        Self {
            binding_type: binding_type.into(),
            direction: direction.map(str::to_string),
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn trigger(binding_type: impl Into<String>) -> Self {
        Self::new(binding_type, Some("in"))
    }
}

/// One recorded signal edge: `name` raised event `signal_name` against
/// the orchestrator that owns this entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalledBy {
    pub name: String,
    pub signal_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInfo {
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_called_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is_signalled_by: Vec<SignalledBy>,
    #[serde(default)]
    pub is_called_by_itself: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl FunctionInfo {
    #[must_use]
    pub fn with_bindings(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Whether any binding declares the given trigger type.
    #[must_use]
    pub fn has_trigger(&self, binding_type: &str) -> bool {
        self.bindings.iter().any(|b| b.binding_type == binding_type)
    }
}

/// A routing proxy: the original descriptor fields plus computed
/// source-location fields and a project-file registration warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyInfo {
    #[serde(flatten)]
    pub descriptor: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(default)]
    pub warning_not_registered_in_project_file: bool,
}

/// Function name -> info. BTreeMap keeps serialized output stable.
pub type FunctionsMap = BTreeMap<String, FunctionInfo>;
/// Proxy name -> info.
pub type ProxiesMap = BTreeMap<String, ProxyInfo>;

/// The runtime flavor of a Functions project, determined once per
/// traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectKind {
    DotNetInProcess,
    DotNetIsolated,
    Java,
    ScriptBased,
}

impl ProjectKind {
    /// True for the kinds whose bindings live in source attributes
    /// rather than (only) in descriptor files.
    #[must_use]
    pub fn is_dotnet(self) -> bool {
        matches!(self, Self::DotNetInProcess | Self::DotNetIsolated)
    }
}

/// The analyzer's sole output. Temp directories created along the way
/// (clones, publish output) are owned by the caller for cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalResult {
    pub functions: FunctionsMap,
    pub proxies: ProxiesMap,
    #[serde(default)]
    pub temp_directories: Vec<PathBuf>,
    pub project_folder: PathBuf,
}
