//! Test utilities for odo output
//!
//! Builders for wire-format lines as odo prints them in `-o json` mode, so
//! tests can feed realistic input through the bridge and decoder.

use serde::Serialize;

use odomon_core::events::{
    ContainerEntry, ContainerState, ContainerStateRunning, ContainerStateWaiting,
    KubernetesPodStatus, LogText, PodEntry, ProgramStatus, ReportError, SupervisordStatus,
};

/// Wrap a payload under its event key, as one line of odo output
pub fn wrap_event<T: Serialize>(kind: &str, payload: &T) -> String {
    let mut wrapper = serde_json::Map::new();
    wrapper.insert(
        kind.to_string(),
        serde_json::to_value(payload).expect("payload serializes"),
    );
    serde_json::Value::Object(wrapper).to_string()
}

/// Creates a pod entry for a devfile component.
///
/// # Arguments
/// * `phase` - Pod phase, e.g. "Running" or "Pending"
/// * `container_running` - Whether the runtime container is started and running
pub fn test_pod(phase: &str, container_running: bool) -> PodEntry {
    let container = if container_running {
        ContainerEntry {
            name: "runtime".to_string(),
            started: Some(true),
            state: ContainerState {
                running: Some(ContainerStateRunning {
                    started_at: Some("2020-06-29T14:00:00Z".to_string()),
                }),
                ..Default::default()
            },
            ready: true,
            ..Default::default()
        }
    } else {
        ContainerEntry {
            name: "runtime".to_string(),
            started: Some(false),
            state: ContainerState {
                waiting: Some(ContainerStateWaiting {
                    reason: Some("ContainerCreating".to_string()),
                    message: None,
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    };

    PodEntry {
        name: "component-abc123".to_string(),
        phase: phase.to_string(),
        containers: vec![container],
        ..Default::default()
    }
}

/// `kubernetesPodStatus` line with a single pod
pub fn pod_status_line(phase: &str, container_running: bool) -> String {
    wrap_event(
        "kubernetesPodStatus",
        &KubernetesPodStatus {
            pods: vec![test_pod(phase, container_running)],
            timestamp: Some("1593440223.123".to_string()),
        },
    )
}

/// `kubernetesPodStatus` line with a running pod and a running container
pub fn running_pod_line() -> String {
    pod_status_line("Running", true)
}

/// `kubernetesPodStatus` line listing no pods at all
pub fn no_pods_line() -> String {
    wrap_event("kubernetesPodStatus", &KubernetesPodStatus::default())
}

/// `supervisordStatus` line from `(program, status)` pairs
pub fn supervisord_line(programs: &[(&str, &str)]) -> String {
    wrap_event(
        "supervisordStatus",
        &SupervisordStatus {
            programs: programs
                .iter()
                .map(|(name, status)| ProgramStatus {
                    name: name.to_string(),
                    status: status.to_string(),
                })
                .collect(),
            timestamp: None,
        },
    )
}

/// `reportError` line
pub fn report_error_line(message: &str) -> String {
    wrap_event(
        "reportError",
        &ReportError {
            name: Some("odo".to_string()),
            message: message.to_string(),
            timestamp: None,
        },
    )
}

/// `logText` line
pub fn log_text_line(text: &str) -> String {
    wrap_event(
        "logText",
        &LogText {
            text: text.to_string(),
            stream: Some("stdout".to_string()),
            timestamp: None,
        },
    )
}
