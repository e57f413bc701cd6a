use took::Took;

use crate::solution::cost::total_distance;
use crate::solution::Assignment;

pub fn format_log_method_assignment_timed(method: &str, assignment: &Assignment, took: Took) -> String {
    format!("{method} - {}, took: {took}", format_log_assignment(assignment))
}

/// `distance/vehicles used/tasks`
pub fn format_log_assignment(assignment: &Assignment) -> String {
    format!(
        "{:.2}/{}/{}",
        total_distance(assignment),
        assignment.iter_non_idle_vehicles().count(),
        assignment.instance().num_tasks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::pdp::tests::two_vehicles_three_tasks;

    #[test]
    fn formats_distance_fleet_and_tasks() {
        let instance = two_vehicles_three_tasks();
        let mut assignment = Assignment::new(&instance);
        assignment.set_route(0, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(format_log_assignment(&assignment), "39.00/1/3");
    }
}
