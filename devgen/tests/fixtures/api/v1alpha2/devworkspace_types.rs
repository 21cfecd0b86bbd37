//! Test fixture: a DevWorkspace API group.
//!
//! +devgen:deepcopy:package

use std::collections::BTreeMap;

/// DevWorkspace is the Schema for the devworkspaces API
/// +kubebuilder:object:root=true
/// +kubebuilder:resource:path=devworkspaces,scope=Namespaced,shortName={dw}
/// +devgen:jsonschema:generate
pub struct DevWorkspace {
    pub spec: DevWorkspaceSpec,
    /// +optional
    pub status: Option<DevWorkspaceStatus>,
}

/// DevWorkspaceSpec defines the desired state of a DevWorkspace
pub struct DevWorkspaceSpec {
    /// Whether the workspace should be running
    pub started: bool,
    /// +devgen:validate:nonEmpty
    /// +devgen:validate:maxLength=63
    pub routing_class: String,
    pub template: DevWorkspaceTemplateSpec,
}

/// +devgen:overrides:generate
pub struct DevWorkspaceTemplateSpec {
    pub components: Vec<Component>,
    /// +devgen:overrides:omit
    pub parent: Option<String>,
    /// +optional
    pub attributes: BTreeMap<String, String>,
}

/// +devgen:overrides:generate
pub struct Component {
    pub name: String,
    pub container: Option<Container>,
}

pub struct Container {
    pub image: String,
    /// +devgen:getter:default=false
    pub mount_sources: Option<bool>,
}

/// +union
pub enum ComponentUnion {
    Container(Container),
    Kubernetes { uri: String },
    Custom,
}

/// DevWorkspaceStatus defines the observed state of a DevWorkspace
/// +devgen:deepcopy:generate=false
pub struct DevWorkspaceStatus {
    pub phase: Phase,
    pub message: Option<String>,
}

pub enum Phase {
    Starting,
    Running,
    Failed,
}
