use enum_map::Enum;
use itertools::Itertools;
use log::trace;
use rand::Rng;

use crate::problem::NodeId;
use crate::solution::Assignment;
use crate::utils::validator::validate;
use crate::utils::Random;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Enum)]
pub enum MoveType {
    None,
    VehicleReassignment,
    TaskOrderSwap,
    BlockMove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    None,
    /// first task of `from` goes to the front of `to`
    VehicleReassignment {
        from: usize,
        to: usize,
        pickup: NodeId,
    },
    /// events `a` and `b` of `vehicle` exchange positions
    TaskOrderSwap { vehicle: usize, a: NodeId, b: NodeId },
    /// task of `pickup` goes to the head of its own chain
    BlockMove { vehicle: usize, pickup: NodeId },
}

impl From<&Move> for MoveType {
    fn from(mv: &Move) -> Self {
        match mv {
            Move::None => MoveType::None,
            Move::VehicleReassignment { .. } => MoveType::VehicleReassignment,
            Move::TaskOrderSwap { .. } => MoveType::TaskOrderSwap,
            Move::BlockMove { .. } => MoveType::BlockMove,
        }
    }
}

/// A fully owned assignment together with the move that produced it.
#[derive(Clone)]
pub struct Candidate<'a> {
    pub mv: Move,
    pub assignment: Assignment<'a>,
}

impl<'a> Candidate<'a> {
    pub fn move_type(&self) -> MoveType {
        MoveType::from(&self.mv)
    }
}

/// Generate-and-filter neighborhood: every candidate is a deep copy of the current assignment,
/// mutated by one move and kept only if it passes the validator.
pub struct Neighborhood {
    discarded: usize,
}

impl Neighborhood {
    pub fn new() -> Self {
        Self { discarded: 0 }
    }

    /// Candidates rejected by the validator since creation.
    pub fn num_discarded(&self) -> usize {
        self.discarded
    }

    /// All valid neighbors of `current`; the first entry is always the unchanged state.
    pub fn generate<'a>(
        &mut self,
        current: &Assignment<'a>,
        rng: &mut Random,
    ) -> Vec<Candidate<'a>> {
        let mut candidates = vec![Candidate {
            mv: Move::None,
            assignment: current.clone(),
        }];

        let non_idle = current.iter_non_idle_vehicles().collect_vec();
        if non_idle.is_empty() {
            return candidates;
        }
        let v1 = non_idle[rng.gen_range(0..non_idle.len())];

        let before = self.discarded;
        self.vehicle_reassignments(current, v1, &mut candidates);
        self.task_order_swaps(current, v1, &mut candidates);
        self.block_moves(current, v1, &mut candidates);
        trace!(
            "neighborhood of vehicle {}: {} candidates, {} discarded",
            v1,
            candidates.len(),
            self.discarded - before
        );
        candidates
    }

    fn push_if_valid<'a>(
        &mut self,
        candidates: &mut Vec<Candidate<'a>>,
        mv: Move,
        assignment: Assignment<'a>,
    ) {
        if validate(&assignment).is_valid() {
            candidates.push(Candidate { mv, assignment });
        } else {
            self.discarded += 1;
        }
    }

    fn vehicle_reassignments<'a>(
        &mut self,
        current: &Assignment<'a>,
        v1: usize,
        candidates: &mut Vec<Candidate<'a>>,
    ) {
        let Some(first) = current.first_event(v1) else {
            return;
        };
        let pickup = if current.instance.is_pickup(first) {
            first
        } else {
            current.instance.pair_of(first)
        };
        for v2 in (0..current.instance.num_vehicles).filter(|&v2| v2 != v1) {
            let mut assignment = current.clone();
            assignment.remove_pd(pickup);
            assignment.update_time(v1);
            assignment.insert_pd_at_front(pickup, v2);
            self.push_if_valid(
                candidates,
                Move::VehicleReassignment {
                    from: v1,
                    to: v2,
                    pickup,
                },
                assignment,
            );
        }
    }

    fn task_order_swaps<'a>(
        &mut self,
        current: &Assignment<'a>,
        v1: usize,
        candidates: &mut Vec<Candidate<'a>>,
    ) {
        for (a, b) in current.route(v1).into_iter().tuple_combinations() {
            let mut assignment = current.clone();
            assignment.swap_events(a, b);
            assignment.update_time(v1);
            self.push_if_valid(
                candidates,
                Move::TaskOrderSwap { vehicle: v1, a, b },
                assignment,
            );
        }
    }

    fn block_moves<'a>(
        &mut self,
        current: &Assignment<'a>,
        v1: usize,
        candidates: &mut Vec<Candidate<'a>>,
    ) {
        let instance = current.instance;
        let pickups = current
            .iter_route(v1)
            .filter(|&e| instance.is_pickup(e))
            .collect_vec();
        for pickup in pickups {
            let already_in_front = current.first_event(v1) == Some(pickup)
                && current.next(pickup) == Some(instance.pair_of(pickup));
            if already_in_front {
                continue;
            }
            let mut assignment = current.clone();
            assignment.remove_pd(pickup);
            assignment.insert_pd_at_front(pickup, v1);
            self.push_if_valid(
                candidates,
                Move::BlockMove {
                    vehicle: v1,
                    pickup,
                },
                assignment,
            );
        }
    }
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::pdp::tests::{line_instance, two_vehicles_three_tasks, vehicle};
    use crate::problem::pdp::PDPInstance;
    use crate::problem::topology::tests::triangle;
    use crate::solution::construction::build_initial_solution;
    use crate::utils::{assert_vec_eq, create_seeded_rng};

    fn single_vehicle_assignment(instance: &PDPInstance) -> Assignment {
        let mut assignment = Assignment::new(instance);
        // vehicle 1 serves all tasks one after another, vehicle 2 is idle
        assignment.set_route(0, &[2, 3, 4, 5, 0, 1]);
        assignment
    }

    #[test]
    fn first_candidate_is_the_unchanged_state() {
        let instance = two_vehicles_three_tasks();
        let mut rng = create_seeded_rng(3);
        let current = build_initial_solution(&instance, &mut rng);
        let candidates = Neighborhood::new().generate(&current, &mut rng);
        assert_eq!(candidates[0].mv, Move::None);
        for v in 0..instance.num_vehicles {
            assert_vec_eq(&current.route(v), &candidates[0].assignment.route(v));
        }
    }

    #[test]
    fn all_candidates_are_valid() {
        let instance = line_instance(3, 7);
        let mut rng = create_seeded_rng(11);
        let current = build_initial_solution(&instance, &mut rng);
        let mut neighborhood = Neighborhood::new();
        for _ in 0..20 {
            for candidate in neighborhood.generate(&current, &mut rng) {
                validate(&candidate.assignment).assert_valid();
            }
        }
    }

    #[test]
    fn loads_stay_within_capacity_and_end_empty() {
        let instance = line_instance(4, 10);
        let mut rng = create_seeded_rng(13);
        let mut current = build_initial_solution(&instance, &mut rng);
        let mut neighborhood = Neighborhood::new();
        for _ in 0..30 {
            let candidates = neighborhood.generate(&current, &mut rng);
            for candidate in &candidates {
                for (v, vehicle) in instance.vehicles.iter().enumerate() {
                    let mut load = 0i64;
                    for event in candidate.assignment.iter_route(v) {
                        load += instance.demand_of(event);
                        assert!(load >= 0, "negative load on vehicle {}", v);
                        assert!(load <= vehicle.capacity as i64, "overload on vehicle {}", v);
                    }
                    assert_eq!(load, 0, "vehicle {} ends loaded", v);
                }
            }
            let next = rng.gen_range(0..candidates.len());
            current = candidates[next].assignment.clone();
        }
    }

    #[test]
    fn produces_each_move_family_on_a_single_chain() {
        let instance = two_vehicles_three_tasks();
        let current = single_vehicle_assignment(&instance);
        let mut rng = create_seeded_rng(5);
        let mut neighborhood = Neighborhood::new();
        let candidates = neighborhood.generate(&current, &mut rng);

        // reassignment of task 2 to the idle vehicle
        let reassigned = candidates
            .iter()
            .find(|c| c.move_type() == MoveType::VehicleReassignment)
            .unwrap();
        assert_vec_eq(&vec![4, 5, 0, 1], &reassigned.assignment.route(0));
        assert_vec_eq(&vec![2, 3], &reassigned.assignment.route(1));

        // of the fifteen swaps only (3, 4) keeps precedence and capacity
        let swaps = candidates
            .iter()
            .filter(|c| c.move_type() == MoveType::TaskOrderSwap)
            .map(|c| c.assignment.route(0))
            .collect_vec();
        assert_eq!(swaps, vec![vec![2, 4, 3, 5, 0, 1]]);

        // task 2 already heads the chain, tasks 3 and 1 are moved in front of it
        let blocks = candidates
            .iter()
            .filter(|c| c.move_type() == MoveType::BlockMove)
            .map(|c| c.assignment.route(0))
            .collect_vec();
        assert_eq!(blocks, vec![vec![4, 5, 2, 3, 0, 1], vec![0, 1, 2, 3, 4, 5]]);
    }

    #[test]
    fn invalid_candidates_are_discarded() {
        let instance = two_vehicles_three_tasks();
        let current = single_vehicle_assignment(&instance);
        let mut rng = create_seeded_rng(5);
        let mut neighborhood = Neighborhood::new();
        let candidates = neighborhood.generate(&current, &mut rng);
        // 1 reassignment, 15 swaps and 2 block moves were tried
        assert_eq!(neighborhood.num_discarded(), 14);
        assert_eq!(candidates.len(), 1 + 1 + 1 + 2);
    }

    #[test]
    fn reassignment_respects_capacity() {
        let instance = two_vehicles_three_tasks();
        let mut assignment = Assignment::new(&instance);
        // heavy task 1 first on vehicle 1, vehicle 2 (capacity 2) cannot take it
        assignment.set_route(0, &[0, 1, 2, 3, 4, 5]);
        let mut rng = create_seeded_rng(9);
        let candidates = Neighborhood::new().generate(&assignment, &mut rng);
        assert!(candidates
            .iter()
            .all(|c| c.move_type() != MoveType::VehicleReassignment));
    }

    #[test]
    fn idle_fleet_only_offers_no_move() {
        let instance = PDPInstance::new("idle", triangle(), vec![vehicle(1, 0, 1)], vec![]).unwrap();
        let current = Assignment::new(&instance);
        let mut rng = create_seeded_rng(1);
        let candidates = Neighborhood::new().generate(&current, &mut rng);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].move_type(), MoveType::None);
    }
}
