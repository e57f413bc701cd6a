use log::debug;
use rand::Rng;

use crate::problem::pdp::PDPInstance;
use crate::problem::{NodeId, TaskId};
use crate::solution::Assignment;
use crate::utils::logging::format_log_assignment;
use crate::utils::Random;

/// Builds a feasible starting assignment where every pickup is directly followed by its delivery.
///
/// With fewer tasks than vehicles all tasks go, in index order, to the first vehicle able to carry
/// the heaviest one. Otherwise tasks are drawn at random and handed out round-robin, skipping
/// vehicles that cannot carry the drawn task.
pub fn build_initial_solution<'a>(instance: &'a PDPInstance, rng: &mut Random) -> Assignment<'a> {
    let mut routes: Vec<Vec<NodeId>> = vec![Vec::new(); instance.num_vehicles];

    let heaviest = instance.tasks.iter().map(|t| t.weight).max().unwrap_or(0);
    let single_vehicle = instance
        .vehicles
        .iter()
        .position(|v| v.check_capacity(heaviest));

    match single_vehicle {
        Some(vehicle) if instance.num_tasks < instance.num_vehicles => {
            for task in 0..instance.num_tasks {
                push_task(instance, &mut routes[vehicle], task);
            }
        }
        _ => {
            let mut unassigned: Vec<TaskId> = (0..instance.num_tasks).collect();
            let mut cursor = 0;
            while !unassigned.is_empty() {
                let task = unassigned.swap_remove(rng.gen_range(0..unassigned.len()));
                let weight = instance.tasks[task].weight;
                // instances are validated, some vehicle always fits
                while !instance.vehicles[cursor].check_capacity(weight) {
                    cursor = (cursor + 1) % instance.num_vehicles;
                }
                push_task(instance, &mut routes[cursor], task);
                cursor = (cursor + 1) % instance.num_vehicles;
            }
        }
    }

    let mut assignment = Assignment::new(instance);
    for (vehicle, route) in routes.iter().enumerate() {
        assignment.set_route(vehicle, route);
    }
    debug!("initial solution: {}", format_log_assignment(&assignment));
    assignment
}

fn push_task(instance: &PDPInstance, route: &mut Vec<NodeId>, task: TaskId) {
    route.push(instance.pickup_of(task));
    route.push(instance.delivery_of(task));
}
