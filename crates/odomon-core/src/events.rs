//! Domain event definitions
//!
//! Payloads of odo's machine-readable (`-o json`) output. Every field is
//! defaulted: odo omits empty fields, and a line with a missing field is still
//! a valid event.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Pod phase that marks a pod as running
pub const POD_PHASE_RUNNING: &str = "Running";

/// Supervisord status that marks a program as running
pub const PROGRAM_STATUS_RUNNING: &str = "RUNNING";

// ─────────────────────────────────────────────────────────
// Devfile Command Events
// ─────────────────────────────────────────────────────────

/// A devfile command started executing in the component container
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandExecutionBegin {
    pub command_id: String,
    pub component_name: String,
    pub command_line: String,
    pub group_kind: String,
    pub timestamp: Option<String>,
}

/// A devfile command finished executing
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandExecutionComplete {
    pub command_id: String,
    pub component_name: String,
    pub command_line: String,
    pub group_kind: String,
    pub error: Option<String>,
    pub timestamp: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Error / Log Events
// ─────────────────────────────────────────────────────────

/// An error reported by odo itself
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportError {
    pub name: Option<String>,
    #[serde(rename = "error", alias = "message")]
    pub message: String,
    pub timestamp: Option<String>,
}

/// A line of output from a command run in the container
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogText {
    pub text: String,
    pub stream: Option<String>,
    pub timestamp: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Status Events
// ─────────────────────────────────────────────────────────

/// State of one supervisord-managed program
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgramStatus {
    #[serde(rename = "program")]
    pub name: String,
    pub status: String,
}

impl ProgramStatus {
    pub fn is_running(&self) -> bool {
        self.status == PROGRAM_STATUS_RUNNING
    }
}

/// Supervisord program table from inside the component container
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupervisordStatus {
    #[serde(rename = "programStatus", deserialize_with = "null_as_default")]
    pub programs: Vec<ProgramStatus>,
    pub timestamp: Option<String>,
}

/// Coarse container status reported by odo
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStatus {
    pub status: String,
    pub timestamp: Option<String>,
}

/// Result of probing one of the component's URLs
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlReachable {
    pub name: String,
    pub url: String,
    #[serde(deserialize_with = "string_or_number")]
    pub port: Option<String>,
    pub secure: Option<bool>,
    pub kind: Option<String>,
    pub reachable: bool,
    pub timestamp: Option<String>,
}

/// Pods backing the component, as seen by Kubernetes
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesPodStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub pods: Vec<PodEntry>,
    pub timestamp: Option<String>,
}

impl KubernetesPodStatus {
    /// First pod in `Running` phase, in the order odo listed them
    pub fn running_pod(&self) -> Option<&PodEntry> {
        self.pods.iter().find(|pod| pod.is_running())
    }
}

/// One pod in a [`KubernetesPodStatus`] event
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodEntry {
    pub name: String,
    pub uid: Option<String>,
    pub phase: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    pub start_time: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub containers: Vec<ContainerEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub init_containers: Vec<ContainerEntry>,
}

impl PodEntry {
    pub fn is_running(&self) -> bool {
        self.phase == POD_PHASE_RUNNING
    }

    /// First container that has started and is in the running state
    pub fn running_container(&self) -> Option<&ContainerEntry> {
        self.containers.iter().find(|c| c.is_running())
    }
}

/// Kubernetes container status inside a pod
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerEntry {
    pub name: String,
    /// `None` when Kubernetes did not report it
    pub started: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub state: ContainerState,
    #[serde(deserialize_with = "null_as_default")]
    pub last_state: ContainerState,
    pub ready: bool,
    pub restart_count: u32,
    pub image: String,
    #[serde(rename = "imageID")]
    pub image_id: String,
    #[serde(rename = "containerID")]
    pub container_id: Option<String>,
}

impl ContainerEntry {
    /// Started and currently in the `running` state
    pub fn is_running(&self) -> bool {
        self.started == Some(true) && self.state.running.is_some()
    }
}

/// Exactly one member is present for a live container
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerState {
    pub running: Option<ContainerStateRunning>,
    pub waiting: Option<ContainerStateWaiting>,
    pub terminated: Option<ContainerStateTerminated>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStateRunning {
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerStateWaiting {
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStateTerminated {
    pub exit_code: i32,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub finished_at: Option<String>,
}

/// odo is written in Go, which encodes an empty slice or map as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// odo has emitted the port both as a number and as a string
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ─────────────────────────────────────────────────────────
// Event Enum
// ─────────────────────────────────────────────────────────

/// One decoded line of odo machine output
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CommandExecutionBegin(CommandExecutionBegin),
    CommandExecutionComplete(CommandExecutionComplete),
    ReportError(ReportError),
    LogText(LogText),
    SupervisordStatus(SupervisordStatus),
    ContainerStatus(ContainerStatus),
    UrlReachable(UrlReachable),
    KubernetesPodStatus(KubernetesPodStatus),
}

impl Event {
    /// Wire name of this event (the JSON key odo wraps it in)
    pub fn kind(&self) -> &'static str {
        match self {
            Event::CommandExecutionBegin(_) => "devFileCommandExecutionBegin",
            Event::CommandExecutionComplete(_) => "devFileCommandExecutionComplete",
            Event::ReportError(_) => "reportError",
            Event::LogText(_) => "logText",
            Event::SupervisordStatus(_) => "supervisordStatus",
            Event::ContainerStatus(_) => "containerStatus",
            Event::UrlReachable(_) => "urlReachable",
            Event::KubernetesPodStatus(_) => "kubernetesPodStatus",
        }
    }

    /// Check if this is an error report
    pub fn is_error(&self) -> bool {
        match self {
            Event::ReportError(_) => true,
            Event::CommandExecutionComplete(c) => c.error.is_some(),
            _ => false,
        }
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        match self {
            Event::CommandExecutionBegin(b) => {
                format!("{} started: {}", b.command_id, b.command_line)
            }
            Event::CommandExecutionComplete(c) => match &c.error {
                Some(err) => format!("{} failed: {}", c.command_id, err),
                None => format!("{} completed", c.command_id),
            },
            Event::ReportError(e) => e.message.clone(),
            Event::LogText(l) => match &l.stream {
                Some(stream) => format!("[{}] {}", stream, l.text),
                None => l.text.clone(),
            },
            Event::SupervisordStatus(s) => {
                if s.programs.is_empty() {
                    "no programs".to_string()
                } else {
                    s.programs
                        .iter()
                        .map(|p| format!("{}={}", p.name, p.status))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
            Event::ContainerStatus(c) => c.status.clone(),
            Event::UrlReachable(u) => {
                let verdict = if u.reachable {
                    "reachable"
                } else {
                    "unreachable"
                };
                format!("{} ({}) {}", u.name, u.url, verdict)
            }
            Event::KubernetesPodStatus(k) => {
                if k.pods.is_empty() {
                    "no pods".to_string()
                } else {
                    k.pods
                        .iter()
                        .map(|p| format!("{}={}", p.name, p.phase))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_container(name: &str) -> ContainerEntry {
        ContainerEntry {
            name: name.to_string(),
            started: Some(true),
            state: ContainerState {
                running: Some(ContainerStateRunning::default()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_container_is_running_needs_started_and_running_state() {
        assert!(running_container("runtime").is_running());

        let not_started = ContainerEntry {
            started: Some(false),
            ..running_container("runtime")
        };
        assert!(!not_started.is_running());

        let unknown_started = ContainerEntry {
            started: None,
            ..running_container("runtime")
        };
        assert!(!unknown_started.is_running());

        let waiting = ContainerEntry {
            state: ContainerState {
                waiting: Some(ContainerStateWaiting {
                    reason: Some("ContainerCreating".to_string()),
                    message: None,
                }),
                ..Default::default()
            },
            ..running_container("runtime")
        };
        assert!(!waiting.is_running());
    }

    #[test]
    fn test_running_pod_is_first_match() {
        let status = KubernetesPodStatus {
            pods: vec![
                PodEntry {
                    name: "old".to_string(),
                    phase: "Pending".to_string(),
                    ..Default::default()
                },
                PodEntry {
                    name: "first".to_string(),
                    phase: "Running".to_string(),
                    ..Default::default()
                },
                PodEntry {
                    name: "second".to_string(),
                    phase: "Running".to_string(),
                    containers: vec![running_container("runtime")],
                    ..Default::default()
                },
            ],
            timestamp: None,
        };

        assert_eq!(status.running_pod().unwrap().name, "first");
    }

    #[test]
    fn test_pod_phase_is_case_sensitive() {
        let pod = PodEntry {
            phase: "running".to_string(),
            ..Default::default()
        };
        assert!(!pod.is_running());
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let status: KubernetesPodStatus =
            serde_json::from_str(r#"{"pods":null,"timestamp":"1"}"#).unwrap();
        assert!(status.pods.is_empty());
        assert_eq!(status.timestamp.as_deref(), Some("1"));

        let status: SupervisordStatus =
            serde_json::from_str(r#"{"programStatus":null}"#).unwrap();
        assert!(status.programs.is_empty());

        let pod: PodEntry = serde_json::from_str(
            r#"{"name":"app","phase":"Running","labels":null,"containers":null,"initContainers":null}"#,
        )
        .unwrap();
        assert!(pod.labels.is_empty());
        assert!(pod.containers.is_empty());
        assert!(pod.init_containers.is_empty());

        let container: ContainerEntry =
            serde_json::from_str(r#"{"name":"runtime","state":null,"lastState":null}"#).unwrap();
        assert_eq!(container.state, ContainerState::default());
    }

    #[test]
    fn test_container_entry_deserializes_kubernetes_names() {
        let json = r#"{
            "name": "runtime",
            "state": {"running": {"startedAt": "2020-06-29T14:00:00Z"}},
            "lastState": {},
            "ready": true,
            "restartCount": 2,
            "image": "quay.io/eclipse/java",
            "imageID": "sha256:abc",
            "containerID": "cri-o://123",
            "started": true
        }"#;
        let container: ContainerEntry = serde_json::from_str(json).unwrap();
        assert!(container.is_running());
        assert_eq!(container.restart_count, 2);
        assert_eq!(container.image_id, "sha256:abc");
        assert_eq!(container.container_id.as_deref(), Some("cri-o://123"));
        assert_eq!(
            container.state.running.unwrap().started_at.as_deref(),
            Some("2020-06-29T14:00:00Z")
        );
    }

    #[test]
    fn test_url_port_accepts_number_and_string() {
        let numeric: UrlReachable =
            serde_json::from_str(r#"{"name":"http","url":"http://a","port":8080}"#).unwrap();
        assert_eq!(numeric.port.as_deref(), Some("8080"));

        let text: UrlReachable =
            serde_json::from_str(r#"{"name":"http","url":"http://a","port":"8443"}"#).unwrap();
        assert_eq!(text.port.as_deref(), Some("8443"));

        let missing: UrlReachable = serde_json::from_str(r#"{"name":"http"}"#).unwrap();
        assert_eq!(missing.port, None);
    }

    #[test]
    fn test_report_error_reads_error_field() {
        let e: ReportError = serde_json::from_str(r#"{"error":"ImagePullBackOff"}"#).unwrap();
        assert_eq!(e.message, "ImagePullBackOff");

        let aliased: ReportError = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        assert_eq!(aliased.message, "boom");
    }

    #[test]
    fn test_program_is_running() {
        let program: ProgramStatus =
            serde_json::from_str(r#"{"program":"devrun","status":"RUNNING"}"#).unwrap();
        assert_eq!(program.name, "devrun");
        assert!(program.is_running());

        let stopped = ProgramStatus {
            status: "STOPPED".to_string(),
            ..program
        };
        assert!(!stopped.is_running());
    }

    #[test]
    fn test_event_summary() {
        let event = Event::SupervisordStatus(SupervisordStatus {
            programs: vec![
                ProgramStatus {
                    name: "devrun".to_string(),
                    status: "RUNNING".to_string(),
                },
                ProgramStatus {
                    name: "debugrun".to_string(),
                    status: "STOPPED".to_string(),
                },
            ],
            timestamp: None,
        });
        assert_eq!(event.summary(), "devrun=RUNNING, debugrun=STOPPED");
        assert_eq!(event.kind(), "supervisordStatus");

        let event = Event::KubernetesPodStatus(KubernetesPodStatus::default());
        assert_eq!(event.summary(), "no pods");
    }

    #[test]
    fn test_event_is_error() {
        assert!(Event::ReportError(ReportError::default()).is_error());
        assert!(Event::CommandExecutionComplete(CommandExecutionComplete {
            error: Some("exit 1".to_string()),
            ..Default::default()
        })
        .is_error());
        assert!(!Event::LogText(LogText::default()).is_error());
    }
}
