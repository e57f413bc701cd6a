use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::problem::pdp::{PDPInstance, Vehicle};
use crate::problem::topology::{DistanceOracle, Topology};
use crate::problem::{CityId, Num};
use crate::solution::Assignment;

/// Single step of a vehicle plan. Task ids are the external labels of [`crate::problem::pdp::Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Action {
    Move(CityId),
    Pickup(usize),
    Deliver(usize),
}

impl Action {
    pub fn describe(&self, topology: &Topology) -> String {
        match self {
            Action::Move(city) => format!("move({})", topology.name(*city)),
            Action::Pickup(task) => format!("pickup({})", task),
            Action::Deliver(task) => format!("deliver({})", task),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move(city) => write!(f, "move(#{})", city),
            Action::Pickup(task) => write!(f, "pickup({})", task),
            Action::Deliver(task) => write!(f, "deliver({})", task),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub vehicle: usize,
    pub start: CityId,
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn empty(vehicle: &Vehicle) -> Self {
        Self {
            vehicle: vehicle.id,
            start: vehicle.home,
            actions: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Length of the road trip described by the move actions.
    pub fn total_distance(&self, oracle: &impl DistanceOracle) -> Num {
        let mut current = self.start;
        let mut distance = 0.0;
        for action in &self.actions {
            if let Action::Move(city) = action {
                distance += oracle.distance(current, *city);
                current = *city;
            }
        }
        distance
    }

    pub fn cost(&self, vehicle: &Vehicle, oracle: &impl DistanceOracle) -> Num {
        self.total_distance(oracle) * vehicle.cost_per_km
    }

    fn travel_to(&mut self, current: &mut CityId, target: CityId, oracle: &impl DistanceOracle) {
        self.actions
            .extend(oracle.path(*current, target).into_iter().map(Action::Move));
        *current = target;
    }
}

/// Expands every vehicle chain into move, pickup and deliver actions. Idle vehicles get an empty
/// plan.
pub fn materialize(assignment: &Assignment) -> Vec<Plan> {
    let instance = assignment.instance();
    instance
        .vehicles
        .iter()
        .enumerate()
        .map(|(v, vehicle)| {
            let mut plan = Plan::empty(vehicle);
            let mut current = vehicle.home;
            for event in assignment.iter_route(v) {
                plan.travel_to(&mut current, instance.location_of(event), &instance.topology);
                let task = &instance.tasks[instance.task_of(event)];
                plan.actions.push(if instance.is_pickup(event) {
                    Action::Pickup(task.id)
                } else {
                    Action::Deliver(task.id)
                });
            }
            plan
        })
        .collect()
}

/// Serves every task in index order on `vehicle`, one task in transit at a time.
pub fn naive_plan(instance: &PDPInstance, vehicle: usize) -> Plan {
    let vehicle = &instance.vehicles[vehicle];
    let mut plan = Plan::empty(vehicle);
    let mut current = vehicle.home;
    for task in &instance.tasks {
        plan.travel_to(&mut current, task.pickup, &instance.topology);
        plan.actions.push(Action::Pickup(task.id));
        plan.travel_to(&mut current, task.delivery, &instance.topology);
        plan.actions.push(Action::Deliver(task.id));
    }
    plan
}

#[cfg(test)]
mod tests {
    use fixedbitset::FixedBitSet;

    use super::*;
    use crate::problem::pdp::tests::{line_instance, two_vehicles_three_tasks, vehicle};
    use crate::problem::topology::tests::triangle;
    use crate::solution::construction::build_initial_solution;
    use crate::solution::cost::total_distance;
    use crate::solution::neighborhood::Neighborhood;
    use crate::utils::{assert_vec_eq, create_seeded_rng};

    fn assert_round_trip(assignment: &Assignment, plans: &Vec<Plan>) {
        let instance = assignment.instance();
        let mut covered = FixedBitSet::with_capacity(instance.num_tasks + 1);
        for plan in plans {
            let mut picked = FixedBitSet::with_capacity(instance.num_tasks + 1);
            for action in &plan.actions {
                match action {
                    Action::Pickup(task) => {
                        assert!(!covered.put(*task), "task {} picked up twice", task);
                        picked.insert(*task);
                    }
                    Action::Deliver(task) => {
                        assert!(picked.contains(*task), "task {} delivered first", task);
                    }
                    Action::Move(_) => {}
                }
            }
        }
        for task in &instance.tasks {
            assert!(covered.contains(task.id));
        }
        let planned: Num = plans.iter().map(|p| p.total_distance(&instance.topology)).sum();
        assert!((planned - total_distance(assignment)).abs() < 1e-9);
    }

    #[test]
    fn scenario_plan_has_moves_before_every_action() {
        let instance = two_vehicles_three_tasks();
        let (a, b, c) = (0, 1, 2);
        let mut assignment = Assignment::new(&instance);
        assignment.set_route(0, &[0, 1, 4, 5]);
        assignment.set_route(1, &[2, 3]);
        let plans = materialize(&assignment);

        assert_eq!(plans.len(), 2);
        assert_vec_eq(
            &vec![
                Action::Pickup(1),
                Action::Move(b),
                Action::Deliver(1),
                Action::Move(a),
                Action::Pickup(3),
                Action::Move(c),
                Action::Deliver(3),
            ],
            &plans[0].actions,
        );
        assert_vec_eq(
            &vec![
                Action::Move(b),
                Action::Pickup(2),
                Action::Move(c),
                Action::Deliver(2),
            ],
            &plans[1].actions,
        );
        assert_eq!(plans[0].total_distance(&instance.topology), 32.0);
        assert_eq!(plans[1].cost(&instance.vehicles[1], &instance.topology), 75.0);
        assert_eq!(plans[1].actions[0].describe(&instance.topology), "move(B)");
        assert_eq!(plans[1].actions[1].to_string(), "pickup(2)");
    }

    #[test]
    fn single_idle_vehicle_gets_an_empty_plan() {
        let instance = PDPInstance::new("idle", triangle(), vec![vehicle(1, 2, 3)], vec![]).unwrap();
        let plans = materialize(&Assignment::new(&instance));
        assert_eq!(plans.len(), 1);
        assert!(plans[0].is_empty());
        assert_eq!(plans[0].start, 2);
    }

    #[test]
    fn round_trip_over_random_neighbors() {
        let instance = line_instance(3, 8);
        let mut rng = create_seeded_rng(21);
        let mut neighborhood = Neighborhood::new();
        let mut current = build_initial_solution(&instance, &mut rng);
        for _ in 0..30 {
            let candidates = neighborhood.generate(&current, &mut rng);
            for candidate in candidates.iter() {
                assert_round_trip(&candidate.assignment, &materialize(&candidate.assignment));
            }
            let last = candidates.len() - 1;
            current = candidates[last].assignment.clone();
        }
    }

    #[test]
    fn naive_plan_serves_tasks_in_order() {
        let instance = two_vehicles_three_tasks();
        let plan = naive_plan(&instance, 0);
        let served = plan
            .actions
            .iter()
            .filter(|a| !matches!(a, Action::Move(_)))
            .cloned()
            .collect::<Vec<_>>();
        assert_vec_eq(
            &vec![
                Action::Pickup(1),
                Action::Deliver(1),
                Action::Pickup(2),
                Action::Deliver(2),
                Action::Pickup(3),
                Action::Deliver(3),
            ],
            &served,
        );
        // A, B | B, C | C -> A, A -> C
        assert_eq!(plan.total_distance(&instance.topology), 10.0 + 5.0 + 12.0 + 12.0);
    }
}
