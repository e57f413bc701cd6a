use crate::problem::Num;
use crate::solution::Assignment;

/// Distance driven by `vehicle`, from its home through every event location of its chain.
pub fn route_distance(assignment: &Assignment, vehicle: usize) -> Num {
    let instance = assignment.instance();
    let mut prev = instance.vehicle_slot(vehicle);
    let mut distance = 0.0;
    for event in assignment.iter_route(vehicle) {
        distance += instance.distance(prev, event);
        prev = event;
    }
    distance
}

/// Total travelled distance of all vehicles, the ranking key of the local search.
pub fn total_distance(assignment: &Assignment) -> Num {
    (0..assignment.instance().num_vehicles)
        .map(|v| route_distance(assignment, v))
        .sum()
}
