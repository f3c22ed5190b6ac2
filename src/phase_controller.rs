//! The hammer/dance state machine.
//!
//! Once per step, before the step is integrated, the controller looks at the
//! infected count carried into the step and decides which phase (and so which
//! transmission rate) applies to it. The two thresholds form a hysteresis
//! band: `dance` switches to `hammer` only above the upper threshold, and
//! `hammer` releases back to `dance` only below the lower one.
//!
//! Every phase change is appended to an ordered transition log and passed to
//! any registered [`TransitionObserver`]s.

use std::fmt::{Display, Formatter};

use ixa::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Strict suppression, low transmission rate.
    Hammer,
    /// Relaxed mitigation, high transmission rate. Every run starts here.
    #[default]
    Dance,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Hammer => write!(f, "hammer"),
            Phase::Dance => write!(f, "dance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    DanceToHammer,
    HammerToDanceThreshold,
    HammerToDanceTimeout,
}

impl TransitionKind {
    /// The phase the controller is in after this transition.
    #[must_use]
    pub fn target(self) -> Phase {
        match self {
            TransitionKind::DanceToHammer => Phase::Hammer,
            TransitionKind::HammerToDanceThreshold | TransitionKind::HammerToDanceTimeout => {
                Phase::Dance
            }
        }
    }
}

impl Display for TransitionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::DanceToHammer => write!(f, "dance_to_hammer"),
            TransitionKind::HammerToDanceThreshold => write!(f, "hammer_to_dance_threshold"),
            TransitionKind::HammerToDanceTimeout => write!(f, "hammer_to_dance_timeout"),
        }
    }
}

/// One phase change: the time at the start of the step that switched, and the
/// infected count observed at the decision point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub time: f64,
    pub kind: TransitionKind,
    pub infected: f64,
}

/// Infected-count thresholds. `dance < hammer` is required; see
/// `Params::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Entering `hammer` requires the infected count to exceed this.
    pub hammer: f64,
    /// Leaving `hammer` requires the infected count to fall below this.
    pub dance: f64,
}

/// Maximum phase durations. Ignored unless `enforce` is set, in which case a
/// hammer period that lasts `hammer_duration` days releases to `dance` even
/// if the infected count is still above the lower threshold.
///
/// `dance_duration` is carried for reporting only; no transition is ever
/// triggered by it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseTimeouts {
    pub hammer_duration: Option<f64>,
    pub dance_duration: Option<f64>,
    pub enforce: bool,
}

/// Receives each transition as the controller records it.
pub trait TransitionObserver {
    fn on_transition(&mut self, event: &TransitionEvent);
}

impl<F> TransitionObserver for F
where
    F: FnMut(&TransitionEvent),
{
    fn on_transition(&mut self, event: &TransitionEvent) {
        self(event);
    }
}

/// Emits one console line per transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl TransitionObserver for LoggingObserver {
    fn on_transition(&mut self, event: &TransitionEvent) {
        match event.kind {
            TransitionKind::DanceToHammer => info!(
                "Day {:.1}: {:.1} infected -> hammer period begins",
                event.time, event.infected
            ),
            TransitionKind::HammerToDanceThreshold => info!(
                "Day {:.1}: {:.1} infected -> dance period (threshold reached)",
                event.time, event.infected
            ),
            TransitionKind::HammerToDanceTimeout => info!(
                "Day {:.1}: {:.1} infected -> dance period (hammer duration expired)",
                event.time, event.infected
            ),
        }
    }
}

/// Step times are `k * dt` products, so the elapsed time of a phase can fall
/// a few ulps short of a whole number of steps.
const ELAPSED_TOLERANCE: f64 = 1e-9;

pub struct PhaseController {
    phase: Phase,
    phase_start: f64,
    thresholds: Thresholds,
    timeouts: PhaseTimeouts,
    transitions: Vec<TransitionEvent>,
    observers: Vec<Box<dyn TransitionObserver>>,
}

impl PhaseController {
    #[must_use]
    pub fn new(thresholds: Thresholds, timeouts: PhaseTimeouts) -> Self {
        PhaseController {
            phase: Phase::default(),
            phase_start: 0.0,
            thresholds,
            timeouts,
            transitions: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: impl TransitionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    #[must_use]
    pub fn transitions(&self) -> &[TransitionEvent] {
        &self.transitions
    }

    #[must_use]
    pub fn into_transitions(self) -> Vec<TransitionEvent> {
        self.transitions
    }

    /// The transition that the rules call for, without applying it.
    #[must_use]
    pub fn pending_transition(&self, time: f64, infected: f64) -> Option<TransitionKind> {
        match self.phase {
            Phase::Dance if infected > self.thresholds.hammer => {
                Some(TransitionKind::DanceToHammer)
            }
            Phase::Dance => None,
            Phase::Hammer if infected < self.thresholds.dance => {
                Some(TransitionKind::HammerToDanceThreshold)
            }
            Phase::Hammer => match self.timeouts {
                PhaseTimeouts {
                    enforce: true,
                    hammer_duration: Some(duration),
                    ..
                } if time - self.phase_start >= duration - ELAPSED_TOLERANCE => {
                    Some(TransitionKind::HammerToDanceTimeout)
                }
                _ => None,
            },
        }
    }

    /// Decide the phase for the step starting at `time`, given the infected
    /// count carried into that step. Records and broadcasts at most one
    /// transition, then returns the phase in force for the step.
    pub fn decide(&mut self, time: f64, infected: f64) -> Phase {
        if let Some(kind) = self.pending_transition(time, infected) {
            self.phase = kind.target();
            self.phase_start = time;
            let event = TransitionEvent {
                time,
                kind,
                infected,
            };
            for observer in &mut self.observers {
                observer.on_transition(&event);
            }
            self.transitions.push(event);
        }
        self.phase
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::{
        Phase, PhaseController, PhaseTimeouts, Thresholds, TransitionEvent, TransitionKind,
    };

    fn controller() -> PhaseController {
        PhaseController::new(
            Thresholds {
                hammer: 50.0,
                dance: 20.0,
            },
            PhaseTimeouts::default(),
        )
    }

    #[test]
    fn test_starts_in_dance() {
        let controller = controller();
        assert_eq!(controller.phase(), Phase::Dance);
        assert!(controller.transitions().is_empty());
    }

    #[test]
    fn test_dance_to_hammer_requires_strictly_above() {
        let mut controller = controller();
        assert_eq!(controller.decide(0.0, 50.0), Phase::Dance);
        assert_eq!(controller.decide(1.0, 50.5), Phase::Hammer);
        assert_eq!(
            controller.transitions(),
            &[TransitionEvent {
                time: 1.0,
                kind: TransitionKind::DanceToHammer,
                infected: 50.5,
            }]
        );
    }

    #[test]
    fn test_hammer_to_dance_requires_strictly_below() {
        let mut controller = controller();
        controller.decide(0.0, 60.0);
        assert_eq!(controller.decide(1.0, 20.0), Phase::Hammer);
        assert_eq!(controller.decide(2.0, 19.9), Phase::Dance);
        let kinds: Vec<TransitionKind> =
            controller.transitions().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::DanceToHammer,
                TransitionKind::HammerToDanceThreshold
            ]
        );
    }

    #[test]
    fn test_phase_holds_inside_band() {
        let mut controller = controller();
        for (t, infected) in [30.0, 45.0, 49.9, 21.0].into_iter().enumerate() {
            assert_eq!(controller.decide(t as f64, infected), Phase::Dance);
        }
        controller.decide(4.0, 80.0);
        for (t, infected) in [49.0, 30.0, 20.1, 60.0].into_iter().enumerate() {
            assert_eq!(controller.decide(5.0 + t as f64, infected), Phase::Hammer);
        }
        assert_eq!(controller.transitions().len(), 1);
    }

    #[test]
    fn test_timeouts_inert_unless_enforced() {
        let mut controller = PhaseController::new(
            Thresholds {
                hammer: 50.0,
                dance: 20.0,
            },
            PhaseTimeouts {
                hammer_duration: Some(3.0),
                dance_duration: Some(3.0),
                enforce: false,
            },
        );
        controller.decide(0.0, 100.0);
        for t in 1..20 {
            assert_eq!(controller.decide(f64::from(t), 40.0), Phase::Hammer);
        }
    }

    #[test]
    fn test_hammer_timeout_when_enforced() {
        let mut controller = PhaseController::new(
            Thresholds {
                hammer: 50.0,
                dance: 20.0,
            },
            PhaseTimeouts {
                hammer_duration: Some(3.0),
                dance_duration: None,
                enforce: true,
            },
        );
        assert_eq!(controller.decide(1.0, 100.0), Phase::Hammer);
        assert_eq!(controller.decide(2.0, 40.0), Phase::Hammer);
        assert_eq!(controller.decide(3.0, 40.0), Phase::Hammer);
        assert_eq!(controller.decide(4.0, 40.0), Phase::Dance);
        assert_eq!(
            controller.transitions().last(),
            Some(&TransitionEvent {
                time: 4.0,
                kind: TransitionKind::HammerToDanceTimeout,
                infected: 40.0,
            })
        );
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_hammer_timeout_on_fractional_steps() {
        let dt = 0.1;
        for start in 1..200_usize {
            let mut controller = PhaseController::new(
                Thresholds {
                    hammer: 50.0,
                    dance: 20.0,
                },
                PhaseTimeouts {
                    hammer_duration: Some(1.0),
                    dance_duration: None,
                    enforce: true,
                },
            );
            assert_eq!(controller.decide(start as f64 * dt, 100.0), Phase::Hammer);
            for k in start + 1..start + 10 {
                assert_eq!(
                    controller.decide(k as f64 * dt, 40.0),
                    Phase::Hammer,
                    "hammer from step {start} released early at step {k}"
                );
            }
            assert_eq!(
                controller.decide((start + 10) as f64 * dt, 40.0),
                Phase::Dance,
                "hammer from step {start} not released after 10 steps"
            );
            assert_eq!(
                controller.transitions()[1].kind,
                TransitionKind::HammerToDanceTimeout
            );
        }
    }

    #[test]
    fn test_threshold_release_wins_over_timeout() {
        let mut controller = PhaseController::new(
            Thresholds {
                hammer: 50.0,
                dance: 20.0,
            },
            PhaseTimeouts {
                hammer_duration: Some(1.0),
                dance_duration: None,
                enforce: true,
            },
        );
        controller.decide(0.0, 100.0);
        controller.decide(5.0, 10.0);
        assert_eq!(
            controller.transitions()[1].kind,
            TransitionKind::HammerToDanceThreshold
        );
    }

    #[test]
    fn test_dance_duration_never_triggers() {
        let mut controller = PhaseController::new(
            Thresholds {
                hammer: 50.0,
                dance: 20.0,
            },
            PhaseTimeouts {
                hammer_duration: None,
                dance_duration: Some(1.0),
                enforce: true,
            },
        );
        for t in 0..10 {
            assert_eq!(controller.decide(f64::from(t), 10.0), Phase::Dance);
        }
        assert!(controller.transitions().is_empty());
    }

    #[test]
    fn test_observers_see_every_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut controller = controller();
        controller.add_observer(move |event: &TransitionEvent| sink.borrow_mut().push(*event));

        controller.decide(0.0, 10.0);
        controller.decide(1.0, 70.0);
        controller.decide(2.0, 30.0);
        controller.decide(3.0, 5.0);

        assert_eq!(seen.borrow().as_slice(), controller.transitions());
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_kind_display_matches_serialization() {
        for kind in [
            TransitionKind::DanceToHammer,
            TransitionKind::HammerToDanceThreshold,
            TransitionKind::HammerToDanceTimeout,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
        assert_eq!(Phase::Hammer.to_string(), "hammer");
        assert_eq!(
            serde_json::to_string(&Phase::Dance).unwrap(),
            "\"dance\""
        );
    }
}
