//! View adapter contract.
//!
//! The simulation is headless; each machine carries a `View` component that
//! accumulates presentation commands for the client and mirrors back the two
//! status flags the client owns (`can_attack`, `attack_ended`). The client
//! drains commands after every step.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Presentation command emitted toward the client's renderer/animator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewCommand {
    /// Locomotion speed for blend trees, in units per second.
    Move(f32),
    /// Start the attack animation.
    Attack,
    /// Stop the attack animation.
    StopAttack,
    /// Aim blend in [-1, 1]; sign picks the attack direction.
    Aim(f32),
    /// Play the scared/fleeing reaction.
    Scared(bool),
}

/// Per-machine view adapter state.
#[derive(Component, Debug, Clone)]
pub struct View {
    commands: Vec<ViewCommand>,
    /// Client-owned: the animator is in a state that may start an attack.
    pub can_attack: bool,
    /// Client-owned: the last attack animation has finished.
    pub attack_ended: bool,
    last_move_speed: Option<f32>,
    last_scared: Option<bool>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            can_attack: true,
            attack_ended: false,
            last_move_speed: None,
            last_scared: None,
        }
    }
}

impl View {
    /// Queue a locomotion speed change. Repeats of the same speed collapse.
    pub fn set_move_speed(&mut self, speed: f32) {
        if self.last_move_speed != Some(speed) {
            self.last_move_speed = Some(speed);
            self.commands.push(ViewCommand::Move(speed));
        }
    }

    pub fn attack(&mut self) {
        self.commands.push(ViewCommand::Attack);
    }

    pub fn stop_attack(&mut self) {
        self.commands.push(ViewCommand::StopAttack);
    }

    pub fn aim(&mut self, blend: f32) {
        self.commands.push(ViewCommand::Aim(blend.clamp(-1.0, 1.0)));
    }

    /// Queue a scared state change. Repeats collapse.
    pub fn set_scared(&mut self, scared: bool) {
        if self.last_scared != Some(scared) {
            self.last_scared = Some(scared);
            self.commands.push(ViewCommand::Scared(scared));
        }
    }

    /// Hand pending commands to the client.
    pub fn drain_commands(&mut self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }
}
