//! Flock system - group membership and leader promotion.
//!
//! Leadership lives in the `Groups` resource and is mirrored onto members
//! as the `Leader` signal. When a leader dies the first living member in
//! iteration order is promoted the same tick.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use tracing::debug;

use crate::components::{Flock, GroupId, Signal, Signals};

#[derive(Resource, Debug, Default)]
pub struct Groups {
    leaders: HashMap<GroupId, Entity>,
}

impl Groups {
    pub fn leader(&self, group: GroupId) -> Option<Entity> {
        self.leaders.get(&group).copied()
    }
}

/// ## Data Access
/// - Reads: Flock
/// - Writes: Groups, Signals
pub fn flock_system(mut groups: ResMut<Groups>, mut query: Query<(Entity, &Flock, &mut Signals)>) {
    let mut living: HashMap<GroupId, Vec<Entity>> = HashMap::new();
    for (entity, flock, signals) in query.iter() {
        if !signals.is_destroyed() {
            living.entry(flock.group).or_default().push(entity);
        }
    }

    // Keep a living leader, otherwise promote the first living member.
    groups.leaders.retain(|group, leader| {
        match living.get(group) {
            Some(members) if members.contains(leader) => true,
            Some(_) => false,
            None => false,
        }
    });
    for (group, members) in &living {
        if !groups.leaders.contains_key(group) {
            if let Some(&first) = members.first() {
                debug!(group = group.0, ?first, "flock leader promoted");
                groups.leaders.insert(*group, first);
            }
        }
    }

    for (entity, flock, mut signals) in query.iter_mut() {
        let is_leader = groups.leader(flock.group) == Some(entity);
        if signals.get(Signal::Leader) != is_leader {
            signals.set(Signal::Leader, is_leader);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(flock_system);
        schedule.run(world);
    }

    #[test]
    fn test_first_member_becomes_leader() {
        let mut world = World::new();
        world.insert_resource(Groups::default());

        let a = world.spawn((Flock { group: GroupId(1) }, Signals::default())).id();
        let b = world.spawn((Flock { group: GroupId(1) }, Signals::default())).id();

        run(&mut world);

        let leader = world.resource::<Groups>().leader(GroupId(1)).unwrap();
        assert!(leader == a || leader == b);
        assert!(world.get::<Signals>(leader).unwrap().get(Signal::Leader));

        let follower = if leader == a { b } else { a };
        assert!(!world.get::<Signals>(follower).unwrap().get(Signal::Leader));
    }

    #[test]
    fn test_dead_leader_is_replaced() {
        let mut world = World::new();
        world.insert_resource(Groups::default());

        world.spawn((Flock { group: GroupId(1) }, Signals::default()));
        world.spawn((Flock { group: GroupId(1) }, Signals::default()));

        run(&mut world);
        let old_leader = world.resource::<Groups>().leader(GroupId(1)).unwrap();

        world
            .get_mut::<Signals>(old_leader)
            .unwrap()
            .set(Signal::Destroyed, true);
        run(&mut world);

        let new_leader = world.resource::<Groups>().leader(GroupId(1)).unwrap();
        assert_ne!(new_leader, old_leader);
        assert!(world.get::<Signals>(new_leader).unwrap().get(Signal::Leader));
    }

    #[test]
    fn test_empty_group_has_no_leader() {
        let mut world = World::new();
        world.insert_resource(Groups::default());

        let only = world.spawn((Flock { group: GroupId(2) }, Signals::default())).id();
        run(&mut world);
        assert!(world.resource::<Groups>().leader(GroupId(2)).is_some());

        world
            .get_mut::<Signals>(only)
            .unwrap()
            .set(Signal::Destroyed, true);
        run(&mut world);
        assert!(world.resource::<Groups>().leader(GroupId(2)).is_none());
    }
}
