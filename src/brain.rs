//! Hierarchical finite state machine configuration and runtime.
//!
//! A brain is built from named states, each holding one or more behavior
//! components and an explicit `(trigger, target state)` transition table.
//! Configurations are compiled and validated up front; a bad table is a
//! load-time `BrainConfigError`, never a runtime surprise.

use std::collections::HashMap;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::behaviors::{Behavior, BehaviorCtx, BehaviorKind, TuningSet};

/// Transition requests raised by behavior components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Idle dwell elapsed; start moving.
    Move,
    /// Wander leg finished; settle down.
    Rest,
    /// Threat gone; drop back to calm behavior.
    Calm,
    /// Target inside the far ring.
    EnemyInSight,
    /// Target inside the near ring and field of view.
    EnemyInRange,
    /// Target left attack range.
    OutOfRange,
    /// Attack budget exhausted.
    MaxAttacks,
}

/// Authoring-time description of one state.
#[derive(Debug, Clone)]
pub struct StateSpec {
    pub name: String,
    pub behaviors: Vec<BehaviorKind>,
    pub transitions: Vec<(Trigger, String)>,
}

impl StateSpec {
    pub fn new(name: &str, behaviors: Vec<BehaviorKind>) -> Self {
        Self {
            name: name.to_string(),
            behaviors,
            transitions: Vec::new(),
        }
    }

    pub fn on(mut self, trigger: Trigger, target: &str) -> Self {
        self.transitions.push((trigger, target.to_string()));
        self
    }
}

/// Configuration validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrainConfigError {
    #[error("brain has no states")]
    NoStates,
    #[error("duplicate state name '{0}'")]
    DuplicateStateName(String),
    #[error("state '{0}' has no behavior components")]
    EmptyState(String),
    #[error("initial state '{0}' does not exist")]
    UnknownInitialState(String),
    #[error("state '{state}' transition '{trigger:?}' targets unknown state '{target}'")]
    UnknownTransitionTarget {
        state: String,
        trigger: Trigger,
        target: String,
    },
    #[error("state '{state}' can raise '{trigger:?}' but maps no transition for it")]
    UnmappedTrigger { state: String, trigger: Trigger },
    #[error("behavior kind {kind:?} is used but has no tuning data")]
    MissingTuning { kind: BehaviorKind },
}

#[derive(Debug)]
pub(crate) struct CompiledState {
    pub name: String,
    pub kinds: Vec<BehaviorKind>,
    pub transitions: HashMap<Trigger, usize>,
}

/// Validated, immutable brain configuration, shared across machines.
#[derive(Debug)]
pub struct BrainConfig {
    pub(crate) states: Vec<CompiledState>,
    pub(crate) initial: usize,
    pub(crate) tuning: TuningSet,
}

impl BrainConfig {
    /// Compile and validate a configuration.
    pub fn build(
        specs: Vec<StateSpec>,
        initial: &str,
        tuning: TuningSet,
    ) -> Result<Arc<Self>, BrainConfigError> {
        if specs.is_empty() {
            return Err(BrainConfigError::NoStates);
        }

        let mut indices: HashMap<String, usize> = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            if indices.insert(spec.name.clone(), i).is_some() {
                return Err(BrainConfigError::DuplicateStateName(spec.name.clone()));
            }
            if spec.behaviors.is_empty() {
                return Err(BrainConfigError::EmptyState(spec.name.clone()));
            }
        }

        let initial = *indices
            .get(initial)
            .ok_or_else(|| BrainConfigError::UnknownInitialState(initial.to_string()))?;

        let mut states = Vec::with_capacity(specs.len());
        for spec in &specs {
            let mut transitions = HashMap::new();
            for (trigger, target) in &spec.transitions {
                let target_idx = *indices.get(target).ok_or_else(|| {
                    BrainConfigError::UnknownTransitionTarget {
                        state: spec.name.clone(),
                        trigger: *trigger,
                        target: target.clone(),
                    }
                })?;
                transitions.insert(*trigger, target_idx);
            }

            // Every trigger the state's components can raise must be mapped.
            for kind in &spec.behaviors {
                for trigger in kind.possible_triggers() {
                    if !transitions.contains_key(trigger) {
                        return Err(BrainConfigError::UnmappedTrigger {
                            state: spec.name.clone(),
                            trigger: *trigger,
                        });
                    }
                }
                tuning.check(*kind)?;
            }

            states.push(CompiledState {
                name: spec.name.clone(),
                kinds: spec.behaviors.clone(),
                transitions,
            });
        }

        Ok(Arc::new(Self {
            states,
            initial,
            tuning,
        }))
    }

    pub fn state_name(&self, index: usize) -> &str {
        &self.states[index].name
    }
}

/// Per-machine FSM runtime. Behavior component instances are owned here;
/// the shared `BrainConfig` holds only the immutable tables.
#[derive(Component, Debug)]
pub struct Brain {
    config: Arc<BrainConfig>,
    states: Vec<Vec<Behavior>>,
    current: usize,
    initialised: bool,
}

impl Brain {
    pub fn new(config: Arc<BrainConfig>) -> Self {
        let states = config
            .states
            .iter()
            .map(|s| {
                s.kinds
                    .iter()
                    .map(|k| Behavior::instantiate(*k, &config.tuning))
                    .collect()
            })
            .collect();
        let current = config.initial;
        Self {
            config,
            states,
            current,
            initialised: false,
        }
    }

    pub fn current_state(&self) -> &str {
        self.config.state_name(self.current)
    }

    /// Run one tick: update the active state's components in order. The
    /// first trigger that actually switches state wins and the remaining
    /// components are skipped for this tick. A trigger that leaves the
    /// state unchanged (self-transition, unmapped) must not starve the
    /// components behind it, so evaluation continues past it.
    pub fn tick(&mut self, ctx: &mut BehaviorCtx) {
        if !self.initialised {
            for state in &mut self.states {
                for behavior in state {
                    behavior.on_init(ctx);
                }
            }
            for behavior in &mut self.states[self.current] {
                behavior.on_enter(ctx, false);
            }
            self.initialised = true;
        }

        let state = self.current;
        for i in 0..self.states[state].len() {
            if let Some(trigger) = self.states[state][i].on_update(ctx) {
                self.apply_trigger(trigger, ctx);
                if self.current != state {
                    break;
                }
            }
        }
    }

    /// Resolve a trigger against the active state's table. Unmapped
    /// triggers cannot happen for validated configs but are tolerated;
    /// a self-transition is a no-op (no exit/re-enter).
    fn apply_trigger(&mut self, trigger: Trigger, ctx: &mut BehaviorCtx) {
        let Some(&next) = self.config.states[self.current].transitions.get(&trigger) else {
            warn!(
                state = self.current_state(),
                ?trigger,
                "trigger with no transition entry, ignoring"
            );
            return;
        };

        if next == self.current {
            return;
        }

        let prior_had_attack = self.config.states[self.current]
            .kinds
            .iter()
            .any(|k| k.is_attack());

        for behavior in &mut self.states[self.current] {
            behavior.on_exit(ctx);
        }

        debug!(
            from = self.config.state_name(self.current),
            to = self.config.state_name(next),
            ?trigger,
            "state switch"
        );

        self.current = next;
        for behavior in &mut self.states[self.current] {
            behavior.on_enter(ctx, prior_had_attack);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::testkit::CtxFixture;
    use crate::behaviors::{IdleTuning, TacticsTuning};
    use crate::components::Signal;

    fn tuning() -> TuningSet {
        TuningSet {
            idle: Some(IdleTuning::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = BrainConfig::build(vec![], "rest", TuningSet::default()).unwrap_err();
        assert_eq!(err, BrainConfigError::NoStates);
    }

    #[test]
    fn test_build_rejects_unknown_initial() {
        let specs = vec![StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest")];
        let err = BrainConfig::build(specs, "nope", tuning()).unwrap_err();
        assert_eq!(err, BrainConfigError::UnknownInitialState("nope".into()));
    }

    #[test]
    fn test_build_rejects_unknown_target() {
        let specs = vec![StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "gone")];
        let err = BrainConfig::build(specs, "rest", tuning()).unwrap_err();
        assert!(matches!(
            err,
            BrainConfigError::UnknownTransitionTarget { .. }
        ));
    }

    #[test]
    fn test_build_rejects_unmapped_trigger() {
        // Idle can raise Move but the state maps nothing.
        let specs = vec![StateSpec::new("rest", vec![BehaviorKind::Idle])];
        let err = BrainConfig::build(specs, "rest", tuning()).unwrap_err();
        assert_eq!(
            err,
            BrainConfigError::UnmappedTrigger {
                state: "rest".into(),
                trigger: Trigger::Move,
            }
        );
    }

    #[test]
    fn test_build_rejects_missing_tuning() {
        let specs = vec![StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest")];
        let err = BrainConfig::build(specs, "rest", TuningSet::default()).unwrap_err();
        assert_eq!(
            err,
            BrainConfigError::MissingTuning {
                kind: BehaviorKind::Idle,
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let specs = vec![
            StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest"),
            StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest"),
        ];
        let err = BrainConfig::build(specs, "rest", tuning()).unwrap_err();
        assert_eq!(err, BrainConfigError::DuplicateStateName("rest".into()));
    }

    #[test]
    fn test_self_transition_does_not_starve_later_components() {
        let tuning = TuningSet {
            idle: Some(IdleTuning {
                dwell_min: 0.1,
                dwell_max: 0.1,
            }),
            tactics: Some(TacticsTuning::default()),
            ..Default::default()
        };
        let specs = vec![
            StateSpec::new("watch", vec![BehaviorKind::Idle, BehaviorKind::Tactics])
                .on(Trigger::Move, "watch")
                .on(Trigger::EnemyInSight, "watch")
                .on(Trigger::EnemyInRange, "strike")
                .on(Trigger::OutOfRange, "watch"),
            StateSpec::new("strike", vec![BehaviorKind::Idle]).on(Trigger::Move, "watch"),
        ];
        let config = BrainConfig::build(specs, "watch", tuning).unwrap();
        let mut brain = Brain::new(config);

        let mut fx = CtxFixture::new();
        fx.dt = 1.0;

        // Idle's dwell expires on the very first update and it raises Move
        // every tick from then on; the self-loop must not hide the arbiter
        // behind it.
        brain.tick(&mut fx.ctx());
        assert_eq!(brain.current_state(), "watch");

        fx.signals.set(Signal::Danger, true);
        brain.tick(&mut fx.ctx());
        assert_eq!(brain.current_state(), "strike");
    }

    #[test]
    fn test_unmapped_trigger_is_ignored() {
        let specs =
            vec![StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest")];
        let config = BrainConfig::build(specs, "rest", tuning()).unwrap();
        let mut brain = Brain::new(config);

        let mut fx = CtxFixture::new();
        brain.tick(&mut fx.ctx());

        // Calm has no entry in the table; the state must simply hold.
        brain.apply_trigger(Trigger::Calm, &mut fx.ctx());
        assert_eq!(brain.current_state(), "rest");
    }

    #[test]
    fn test_valid_config_builds() {
        let specs = vec![StateSpec::new("rest", vec![BehaviorKind::Idle]).on(Trigger::Move, "rest")];
        let config = BrainConfig::build(specs, "rest", tuning()).unwrap();
        assert_eq!(config.state_name(config.initial), "rest");

        let brain = Brain::new(config);
        assert_eq!(brain.current_state(), "rest");
    }
}
