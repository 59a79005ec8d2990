//! Component status reconciliation
//!
//! Folds odo events into a [`ComponentStatus`] snapshot. [`reconcile`] is a
//! pure function from (snapshot, event) to the next snapshot;
//! [`StatusTracker`] owns the current snapshot for one monitoring session and
//! reports a [`StatusChange`] whenever an event changes it in a way the user
//! can see.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::{Event, KubernetesPodStatus, SupervisordStatus};

/// Supervisord program that runs the component's dev loop
pub const DEFAULT_PROGRAM_NAME: &str = "devrun";

/// What we know about the supervisord program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramState {
    /// No supervisord status has been evaluated yet
    #[default]
    Unknown,
    Running,
    NotRunning,
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramState::Unknown => write!(f, "unknown"),
            ProgramState::Running => write!(f, "running"),
            ProgramState::NotRunning => write!(f, "not running"),
        }
    }
}

/// Rules the reconciler applies; defaults match odo's devfile components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRules {
    /// Program that must be `RUNNING` for the component to count as running
    pub program_name: String,
    /// Program state written when the snapshot is reset by an error or a lost pod
    pub reset_program_state: ProgramState,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self {
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            reset_program_state: ProgramState::NotRunning,
        }
    }
}

/// Derived phase of a snapshot, in the order status text is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPhase {
    Error,
    PodNotStarted,
    PodRunningContainerStopped,
    /// Pod and container run; supervisord not seen yet
    AwaitingProgramStatus,
    ProgramStopped,
    Running,
}

/// Immutable snapshot of the component's believed health
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComponentStatus {
    pub error: Option<String>,
    pub pod_running: bool,
    pub container_running: bool,
    pub program: ProgramState,
}

impl ComponentStatus {
    /// Nothing observed yet
    pub fn initial() -> Self {
        Self::default()
    }

    /// Baseline used when an error or a lost pod invalidates everything
    pub fn reset(rules: &StatusRules) -> Self {
        Self {
            program: rules.reset_program_state,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> StatusPhase {
        if self.error.is_some() {
            StatusPhase::Error
        } else if !self.pod_running {
            StatusPhase::PodNotStarted
        } else if !self.container_running {
            StatusPhase::PodRunningContainerStopped
        } else {
            match self.program {
                ProgramState::Unknown => StatusPhase::AwaitingProgramStatus,
                ProgramState::NotRunning => StatusPhase::ProgramStopped,
                ProgramState::Running => StatusPhase::Running,
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == StatusPhase::Running
    }

    /// Status text shown to the user, `None` while it cannot be determined
    pub fn describe(&self) -> Option<String> {
        match self.phase() {
            StatusPhase::Error => Some(format!(
                "Not running - error occurred: {}",
                self.error.as_deref().unwrap_or_default()
            )),
            StatusPhase::PodNotStarted => {
                Some("Not running - Component pod not started.".to_string())
            }
            StatusPhase::PodRunningContainerStopped => {
                Some("Not running - Container not running".to_string())
            }
            StatusPhase::AwaitingProgramStatus => None,
            StatusPhase::ProgramStopped => {
                Some("Not running - Supervisord program not running".to_string())
            }
            StatusPhase::Running => Some("Running".to_string()),
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ error: {}, pod_running: {}, container_running: {}, program: {} }}",
            self.error.as_deref().unwrap_or("none"),
            self.pod_running,
            self.container_running,
            self.program
        )
    }
}

// ─────────────────────────────────────────────────────────
// Reducer
// ─────────────────────────────────────────────────────────

/// Compute the snapshot that follows `current` once `event` is observed
pub fn reconcile(current: &ComponentStatus, event: &Event, rules: &StatusRules) -> ComponentStatus {
    match event {
        Event::ReportError(report) => ComponentStatus {
            error: Some(report.message.clone()),
            ..ComponentStatus::reset(rules)
        },
        Event::KubernetesPodStatus(pods) => reconcile_pods(current, pods, rules),
        Event::SupervisordStatus(status) => reconcile_supervisord(current, status, rules),
        Event::CommandExecutionBegin(_)
        | Event::CommandExecutionComplete(_)
        | Event::LogText(_)
        | Event::ContainerStatus(_)
        | Event::UrlReachable(_) => current.clone(),
    }
}

fn reconcile_pods(
    current: &ComponentStatus,
    status: &KubernetesPodStatus,
    rules: &StatusRules,
) -> ComponentStatus {
    let Some(pod) = status.running_pod() else {
        return ComponentStatus::reset(rules);
    };

    if pod.running_container().is_some() {
        ComponentStatus {
            error: None,
            pod_running: true,
            container_running: true,
            program: current.program,
        }
    } else {
        ComponentStatus {
            pod_running: true,
            container_running: false,
            ..ComponentStatus::reset(rules)
        }
    }
}

fn reconcile_supervisord(
    current: &ComponentStatus,
    status: &SupervisordStatus,
    rules: &StatusRules,
) -> ComponentStatus {
    // Only meaningful once Kubernetes says the container is up
    if !(current.pod_running && current.container_running) {
        return current.clone();
    }

    let running = status
        .programs
        .iter()
        .any(|p| p.name == rules.program_name && p.is_running());

    ComponentStatus {
        program: if running {
            ProgramState::Running
        } else {
            ProgramState::NotRunning
        },
        ..current.clone()
    }
}

// ─────────────────────────────────────────────────────────
// Tracker
// ─────────────────────────────────────────────────────────

/// A visible change of component status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: ComponentStatus,
    pub current: ComponentStatus,
    pub text: String,
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text, self.current)
    }
}

/// Owns the snapshot of one monitoring session
#[derive(Debug, Clone)]
pub struct StatusTracker {
    current: ComponentStatus,
    rules: StatusRules,
}

impl StatusTracker {
    pub fn new(rules: StatusRules) -> Self {
        Self {
            current: ComponentStatus::initial(),
            rules,
        }
    }

    pub fn current(&self) -> &ComponentStatus {
        &self.current
    }

    pub fn rules(&self) -> &StatusRules {
        &self.rules
    }

    /// Fold one event in; returns the change to report, if any
    ///
    /// The new snapshot is always adopted, even when its description is
    /// suppressed because the program state is still unknown.
    pub fn apply(&mut self, event: &Event) -> Option<StatusChange> {
        let next = reconcile(&self.current, event, &self.rules);
        if next == self.current {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, next);
        tracing::debug!("Component status: {} -> {}", previous, self.current);

        self.current.describe().map(|text| StatusChange {
            previous,
            current: self.current.clone(),
            text,
        })
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new(StatusRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        ContainerEntry, ContainerState, ContainerStateRunning, LogText, PodEntry, ProgramStatus,
        ReportError, UrlReachable,
    };

    fn container(started: Option<bool>, running: bool) -> ContainerEntry {
        ContainerEntry {
            name: "runtime".to_string(),
            started,
            state: ContainerState {
                running: running.then(ContainerStateRunning::default),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn pods(entries: Vec<(&str, Vec<ContainerEntry>)>) -> Event {
        Event::KubernetesPodStatus(KubernetesPodStatus {
            pods: entries
                .into_iter()
                .enumerate()
                .map(|(i, (phase, containers))| PodEntry {
                    name: format!("component-{}", i),
                    phase: phase.to_string(),
                    containers,
                    ..Default::default()
                })
                .collect(),
            timestamp: None,
        })
    }

    fn pod_up() -> Event {
        pods(vec![("Running", vec![container(Some(true), true)])])
    }

    fn supervisord(programs: &[(&str, &str)]) -> Event {
        Event::SupervisordStatus(SupervisordStatus {
            programs: programs
                .iter()
                .map(|(name, status)| ProgramStatus {
                    name: name.to_string(),
                    status: status.to_string(),
                })
                .collect(),
            timestamp: None,
        })
    }

    fn report_error(message: &str) -> Event {
        Event::ReportError(ReportError {
            message: message.to_string(),
            ..Default::default()
        })
    }

    fn running_snapshot() -> ComponentStatus {
        ComponentStatus {
            error: None,
            pod_running: true,
            container_running: true,
            program: ProgramState::Running,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Scenarios
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_pod_and_container_up_suppresses_notification() {
        let mut tracker = StatusTracker::default();

        let change = tracker.apply(&pod_up());

        assert!(change.is_none());
        assert_eq!(
            tracker.current(),
            &ComponentStatus {
                error: None,
                pod_running: true,
                container_running: true,
                program: ProgramState::Unknown,
            }
        );
        assert_eq!(tracker.current().phase(), StatusPhase::AwaitingProgramStatus);
    }

    #[test]
    fn test_devrun_running_reports_running() {
        let mut tracker = StatusTracker::default();
        tracker.apply(&pod_up());

        let change = tracker.apply(&supervisord(&[("devrun", "RUNNING")])).unwrap();

        assert_eq!(change.text, "Running");
        assert_eq!(change.current.program, ProgramState::Running);
        assert_eq!(change.previous.program, ProgramState::Unknown);
        assert!(tracker.current().is_running());
    }

    #[test]
    fn test_error_after_running_reports_error() {
        let mut tracker = StatusTracker::default();
        tracker.apply(&pod_up());
        tracker.apply(&supervisord(&[("devrun", "RUNNING")]));

        let change = tracker.apply(&report_error("ImagePullBackOff")).unwrap();

        assert_eq!(change.text, "Not running - error occurred: ImagePullBackOff");
        assert_eq!(change.current.error.as_deref(), Some("ImagePullBackOff"));
        assert!(!change.current.pod_running);
        assert!(!change.current.container_running);
        assert_eq!(change.current.program, ProgramState::NotRunning);
    }

    #[test]
    fn test_zero_pods_from_initial_keeps_baseline_flags() {
        let mut tracker = StatusTracker::default();

        let change = tracker.apply(&pods(vec![]));

        let current = tracker.current();
        assert_eq!(current.error, None);
        assert!(!current.pod_running);
        assert!(!current.container_running);
        // The reset writes NotRunning where the initial snapshot says Unknown,
        // so the first reset from the initial state is a visible change.
        assert_eq!(current.program, ProgramState::NotRunning);
        assert_eq!(
            change.unwrap().text,
            "Not running - Component pod not started."
        );
    }

    #[test]
    fn test_zero_pods_with_unknown_reset_is_no_change() {
        let rules = StatusRules {
            reset_program_state: ProgramState::Unknown,
            ..StatusRules::default()
        };
        let mut tracker = StatusTracker::new(rules);

        let change = tracker.apply(&pods(vec![]));

        assert!(change.is_none());
        assert_eq!(tracker.current(), &ComponentStatus::initial());
    }

    // ─────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_no_running_pod_always_resets() {
        let rules = StatusRules::default();
        let priors = vec![
            ComponentStatus::initial(),
            running_snapshot(),
            ComponentStatus {
                error: Some("boom".to_string()),
                ..ComponentStatus::initial()
            },
            ComponentStatus {
                pod_running: true,
                ..ComponentStatus::initial()
            },
        ];
        let events = vec![
            pods(vec![]),
            pods(vec![("Pending", vec![]), ("Succeeded", vec![])]),
            pods(vec![("Failed", vec![container(Some(true), true)])]),
        ];

        for prior in &priors {
            for event in &events {
                let next = reconcile(prior, event, &rules);
                assert_eq!(next, ComponentStatus::reset(&rules));
                assert_eq!(next.error, None);
                assert!(!next.pod_running);
                assert!(!next.container_running);
            }
        }
    }

    #[test]
    fn test_supervisord_ignored_until_container_runs() {
        let mut tracker = StatusTracker::default();

        assert!(tracker.apply(&supervisord(&[("devrun", "RUNNING")])).is_none());
        assert_eq!(tracker.current(), &ComponentStatus::initial());

        // Pod up but container not running yet
        tracker.apply(&pods(vec![("Running", vec![container(Some(false), false)])]));
        let before = tracker.current().clone();
        assert!(tracker.apply(&supervisord(&[("devrun", "RUNNING")])).is_none());
        assert_eq!(tracker.current(), &before);
    }

    #[test]
    fn test_same_event_twice_is_idempotent() {
        let events = vec![
            pod_up(),
            supervisord(&[("devrun", "RUNNING")]),
            report_error("CrashLoopBackOff"),
            pods(vec![]),
            pods(vec![("Running", vec![])]),
        ];

        for event in events {
            let mut tracker = StatusTracker::default();
            tracker.apply(&pod_up());
            tracker.apply(&event);
            let first = tracker.current().clone();

            assert!(tracker.apply(&event).is_none());
            assert_eq!(tracker.current(), &first);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Transition details
    // ─────────────────────────────────────────────────────────

    #[test]
    fn test_running_pod_without_running_container() {
        let rules = StatusRules::default();
        let event = pods(vec![(
            "Running",
            vec![container(Some(true), false), container(None, true)],
        )]);

        let next = reconcile(&running_snapshot(), &event, &rules);

        assert_eq!(
            next,
            ComponentStatus {
                error: None,
                pod_running: true,
                container_running: false,
                program: ProgramState::NotRunning,
            }
        );
        assert_eq!(
            next.describe().as_deref(),
            Some("Not running - Container not running")
        );
    }

    #[test]
    fn test_running_container_clears_error_and_keeps_program() {
        let rules = StatusRules::default();
        let prior = ComponentStatus {
            error: Some("old failure".to_string()),
            pod_running: false,
            container_running: false,
            program: ProgramState::Running,
        };

        let next = reconcile(&prior, &pod_up(), &rules);

        assert_eq!(next.error, None);
        assert!(next.pod_running && next.container_running);
        assert_eq!(next.program, ProgramState::Running);
    }

    #[test]
    fn test_only_first_running_pod_is_inspected() {
        let rules = StatusRules::default();
        let event = pods(vec![
            ("Running", vec![container(Some(true), false)]),
            ("Running", vec![container(Some(true), true)]),
        ]);

        let next = reconcile(&ComponentStatus::initial(), &event, &rules);

        assert!(next.pod_running);
        assert!(!next.container_running);
    }

    #[test]
    fn test_init_containers_do_not_count() {
        let rules = StatusRules::default();
        let event = Event::KubernetesPodStatus(KubernetesPodStatus {
            pods: vec![PodEntry {
                phase: "Running".to_string(),
                init_containers: vec![container(Some(true), true)],
                ..Default::default()
            }],
            timestamp: None,
        });

        let next = reconcile(&ComponentStatus::initial(), &event, &rules);
        assert!(!next.container_running);
    }

    #[test]
    fn test_supervisord_program_must_match_name_and_status() {
        let mut tracker = StatusTracker::default();
        tracker.apply(&pod_up());

        let change = tracker
            .apply(&supervisord(&[("debugrun", "RUNNING"), ("devrun", "STARTING")]))
            .unwrap();
        assert_eq!(change.text, "Not running - Supervisord program not running");
        assert_eq!(tracker.current().phase(), StatusPhase::ProgramStopped);

        let change = tracker
            .apply(&supervisord(&[("debugrun", "RUNNING"), ("devrun", "RUNNING")]))
            .unwrap();
        assert_eq!(change.text, "Running");
    }

    #[test]
    fn test_custom_program_name() {
        let rules = StatusRules {
            program_name: "debugrun".to_string(),
            ..StatusRules::default()
        };
        let mut tracker = StatusTracker::new(rules);
        tracker.apply(&pod_up());

        let change = tracker.apply(&supervisord(&[("debugrun", "RUNNING")])).unwrap();
        assert_eq!(change.text, "Running");
    }

    #[test]
    fn test_passive_events_leave_snapshot_alone() {
        let mut tracker = StatusTracker::default();
        tracker.apply(&pod_up());
        tracker.apply(&supervisord(&[("devrun", "RUNNING")]));
        let before = tracker.current().clone();

        let passive = vec![
            Event::LogText(LogText {
                text: "compiling".to_string(),
                ..Default::default()
            }),
            Event::UrlReachable(UrlReachable {
                reachable: false,
                ..Default::default()
            }),
            Event::ContainerStatus(Default::default()),
            Event::CommandExecutionBegin(Default::default()),
            Event::CommandExecutionComplete(Default::default()),
        ];

        for event in &passive {
            assert!(tracker.apply(event).is_none());
            assert_eq!(tracker.current(), &before);
        }
    }

    #[test]
    fn test_error_overrides_running_state() {
        let rules = StatusRules::default();
        let next = reconcile(&running_snapshot(), &report_error("x"), &rules);
        assert_eq!(next.phase(), StatusPhase::Error);
        assert_eq!(
            next.describe().as_deref(),
            Some("Not running - error occurred: x")
        );
    }

    #[test]
    fn test_reconcile_does_not_touch_input() {
        let rules = StatusRules::default();
        let prior = running_snapshot();
        let copy = prior.clone();

        let _ = reconcile(&prior, &report_error("boom"), &rules);

        assert_eq!(prior, copy);
    }

    #[test]
    fn test_display_includes_raw_fields() {
        let status = ComponentStatus {
            error: Some("ImagePullBackOff".to_string()),
            ..ComponentStatus::initial()
        };
        assert_eq!(
            status.to_string(),
            "{ error: ImagePullBackOff, pod_running: false, container_running: false, program: unknown }"
        );
    }

    #[test]
    fn test_change_display_is_text_then_snapshot() {
        let change = StatusChange {
            previous: ComponentStatus::initial(),
            current: running_snapshot(),
            text: "Running".to_string(),
        };
        assert_eq!(
            change.to_string(),
            "Running { error: none, pod_running: true, container_running: true, program: running }"
        );
    }
}
