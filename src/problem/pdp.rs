use std::fmt::{Debug, Formatter};

use ahash::AHashSet;

use crate::problem::topology::{DistanceOracle, Topology};
use crate::problem::{Capacity, CityId, NodeId, Num, PlanningError, TaskId};

#[derive(Debug, Clone)]
pub struct Vehicle {
    /// label used in output, `1..=V` in scenario files
    pub id: usize,
    pub home: CityId,
    pub capacity: Capacity,
    pub cost_per_km: Num,
}

impl Vehicle {
    pub fn check_capacity(&self, demand: Capacity) -> bool {
        demand <= self.capacity
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    /// label used in output, `1..=T` in scenario files
    pub id: usize,
    pub pickup: CityId,
    pub delivery: CityId,
    pub weight: Capacity,
    pub reward: Num,
}

/// One planning call's immutable input.
///
/// Events and vehicle slots share a dense id space: the pickup of task `t` is `2t`, its delivery
/// `2t + 1` and the slot of vehicle `v` is `2T + v`.
pub struct PDPInstance {
    pub name: String,
    pub num_tasks: usize,
    pub num_vehicles: usize,
    pub tasks: Vec<Task>,
    pub vehicles: Vec<Vehicle>,
    pub topology: Topology,
}

impl Debug for PDPInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PDP instance {}:", self.name)
            .and(writeln!(
                f,
                "{} vehicles: {:?}",
                self.vehicles.len(),
                self.vehicles
            ))
            .and(write!(f, "{} tasks: {:?}", self.tasks.len(), self.tasks))
    }
}

impl PDPInstance {
    pub fn new(
        name: impl Into<String>,
        topology: Topology,
        vehicles: Vec<Vehicle>,
        tasks: Vec<Task>,
    ) -> Result<Self, PlanningError> {
        if vehicles.is_empty() {
            return Err(PlanningError::EmptyFleet);
        }
        let instance = Self {
            name: name.into(),
            num_tasks: tasks.len(),
            num_vehicles: vehicles.len(),
            tasks,
            vehicles,
            topology,
        };
        instance.check_labels()?;
        instance.check_locations()?;
        instance.check_tasks()?;
        Ok(instance)
    }

    fn check_labels(&self) -> Result<(), PlanningError> {
        let mut seen = AHashSet::with_capacity(self.num_vehicles);
        if let Some(vehicle) = self.vehicles.iter().find(|v| !seen.insert(v.id)) {
            return Err(PlanningError::DuplicateVehicle(vehicle.id));
        }
        let mut seen = AHashSet::with_capacity(self.num_tasks);
        if let Some(task) = self.tasks.iter().find(|t| !seen.insert(t.id)) {
            return Err(PlanningError::DuplicateTask(task.id));
        }
        Ok(())
    }

    fn check_locations(&self) -> Result<(), PlanningError> {
        let num_cities = self.topology.num_cities();
        let homes = self.vehicles.iter().map(|v| v.home);
        let stops = self.tasks.iter().flat_map(|t| [t.pickup, t.delivery]);
        match homes.chain(stops).find(|&city| city >= num_cities) {
            Some(city) => Err(PlanningError::UnknownCity(format!("#{}", city))),
            None => Ok(()),
        }
    }

    fn check_tasks(&self) -> Result<(), PlanningError> {
        let max_capacity = self.max_capacity();
        let unreachable = |from: CityId, to: CityId| PlanningError::Unreachable {
            from: self.topology.name(from).to_string(),
            to: self.topology.name(to).to_string(),
        };
        for task in &self.tasks {
            if task.weight > max_capacity {
                return Err(PlanningError::InfeasibleTask {
                    task: task.id,
                    weight: task.weight,
                    max_capacity,
                });
            }
            if !self.topology.is_reachable(task.pickup, task.delivery) {
                return Err(unreachable(task.pickup, task.delivery));
            }
            if let Some(vehicle) = self
                .vehicles
                .iter()
                .find(|v| !self.topology.is_reachable(v.home, task.pickup))
            {
                return Err(unreachable(vehicle.home, task.pickup));
            }
        }
        Ok(())
    }

    /// Number of pickup and delivery events.
    pub fn num_events(&self) -> usize {
        self.num_tasks * 2
    }

    /// Events plus one slot per vehicle.
    pub fn num_nodes(&self) -> usize {
        self.num_events() + self.num_vehicles
    }

    pub fn pickup_of(&self, task: TaskId) -> NodeId {
        task * 2
    }
    pub fn delivery_of(&self, task: TaskId) -> NodeId {
        task * 2 + 1
    }
    pub fn task_of(&self, event: NodeId) -> TaskId {
        debug_assert!(self.is_event(event));
        event / 2
    }
    pub fn pair_of(&self, event: NodeId) -> NodeId {
        debug_assert!(self.is_event(event));
        event ^ 1
    }
    pub fn is_event(&self, node: NodeId) -> bool {
        node < self.num_events()
    }
    pub fn is_pickup(&self, node: NodeId) -> bool {
        self.is_event(node) && node % 2 == 0
    }
    pub fn is_delivery(&self, node: NodeId) -> bool {
        self.is_event(node) && node % 2 == 1
    }

    pub fn vehicle_slot(&self, vehicle: usize) -> NodeId {
        self.num_events() + vehicle
    }
    pub fn is_vehicle_slot(&self, node: NodeId) -> bool {
        node >= self.num_events() && node < self.num_nodes()
    }
    pub fn vehicle_of_slot(&self, slot: NodeId) -> usize {
        debug_assert!(self.is_vehicle_slot(slot));
        slot - self.num_events()
    }

    /// City where the event happens, or the home of the vehicle for a slot.
    pub fn location_of(&self, node: NodeId) -> CityId {
        if self.is_vehicle_slot(node) {
            self.vehicles[self.vehicle_of_slot(node)].home
        } else {
            let task = &self.tasks[self.task_of(node)];
            if node % 2 == 0 {
                task.pickup
            } else {
                task.delivery
            }
        }
    }

    /// Signed load change caused by an event.
    pub fn demand_of(&self, event: NodeId) -> i64 {
        let weight = self.tasks[self.task_of(event)].weight as i64;
        if self.is_pickup(event) {
            weight
        } else {
            -weight
        }
    }

    pub fn max_capacity(&self) -> Capacity {
        self.vehicles.iter().map(|v| v.capacity).max().unwrap_or(0)
    }

    pub fn distance(&self, from: NodeId, to: NodeId) -> Num {
        self.topology
            .distance(self.location_of(from), self.location_of(to))
    }

    pub fn iter_pickups(&self) -> impl Iterator<Item = NodeId> {
        (0..self.num_tasks).map(|t| t * 2)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::problem::topology::tests::triangle;
    use crate::problem::topology::TopologyBuilder;

    pub(crate) fn vehicle(id: usize, home: CityId, capacity: Capacity) -> Vehicle {
        Vehicle {
            id,
            home,
            capacity,
            cost_per_km: 5.0,
        }
    }

    pub(crate) fn task(id: usize, pickup: CityId, delivery: CityId, weight: Capacity) -> Task {
        Task {
            id,
            pickup,
            delivery,
            weight,
            reward: 100.0,
        }
    }

    /// Two vehicles (capacity 4 and 2) at A and three tasks on the A/B/C triangle.
    pub(crate) fn two_vehicles_three_tasks() -> PDPInstance {
        let (a, b, c) = (0, 1, 2);
        PDPInstance::new(
            "triangle",
            triangle(),
            vec![vehicle(1, a, 4), vehicle(2, a, 2)],
            vec![task(1, a, b, 3), task(2, b, c, 1), task(3, a, c, 2)],
        )
        .unwrap()
    }

    /// A line of `num_cities` unit-length roads with tasks spread over it.
    pub(crate) fn line_instance(num_vehicles: usize, num_tasks: usize) -> PDPInstance {
        let num_cities = 8;
        let mut builder = TopologyBuilder::new();
        for i in 0..num_cities {
            builder.add_city(format!("c{}", i)).unwrap();
        }
        for i in 1..num_cities {
            builder
                .add_road(&format!("c{}", i - 1), &format!("c{}", i), 1.0 + (i % 3) as f64)
                .unwrap();
        }
        let vehicles = (0..num_vehicles)
            .map(|v| vehicle(v + 1, (v * 3) % num_cities, 3 + (v % 2) as Capacity))
            .collect();
        let tasks = (0..num_tasks)
            .map(|t| {
                task(
                    t + 1,
                    (t * 5) % num_cities,
                    (t * 3 + 1) % num_cities,
                    1 + (t % 3) as Capacity,
                )
            })
            .collect();
        PDPInstance::new("line", builder.build(), vehicles, tasks).unwrap()
    }

    #[test]
    fn node_ids_are_dense() {
        let instance = two_vehicles_three_tasks();
        assert_eq!(instance.num_events(), 6);
        assert_eq!(instance.num_nodes(), 8);
        assert_eq!(instance.pickup_of(2), 4);
        assert_eq!(instance.delivery_of(2), 5);
        assert_eq!(instance.task_of(5), 2);
        assert_eq!(instance.pair_of(4), 5);
        assert_eq!(instance.pair_of(5), 4);
        assert!(instance.is_pickup(0));
        assert!(instance.is_delivery(1));
        assert!(!instance.is_pickup(6));
        assert_eq!(instance.vehicle_slot(1), 7);
        assert!(instance.is_vehicle_slot(6));
        assert_eq!(instance.vehicle_of_slot(7), 1);
        assert_eq!(instance.location_of(1), 1);
        assert_eq!(instance.location_of(7), 0);
        assert_eq!(instance.demand_of(0), 3);
        assert_eq!(instance.demand_of(1), -3);
        assert_eq!(instance.distance(0, 1), 10.0);
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let result = PDPInstance::new("empty", triangle(), vec![], vec![task(1, 0, 1, 1)]);
        assert_eq!(result.err(), Some(PlanningError::EmptyFleet));
    }

    #[test]
    fn overweight_task_is_rejected() {
        let result = PDPInstance::new(
            "heavy",
            triangle(),
            vec![vehicle(1, 0, 4), vehicle(2, 0, 2)],
            vec![task(1, 0, 1, 3), task(2, 1, 2, 5)],
        );
        assert_eq!(
            result.err(),
            Some(PlanningError::InfeasibleTask {
                task: 2,
                weight: 5,
                max_capacity: 4
            })
        );
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let result = PDPInstance::new(
            "twice",
            triangle(),
            vec![vehicle(1, 0, 4), vehicle(2, 0, 2)],
            vec![task(1, 0, 1, 3), task(2, 1, 2, 1), task(1, 0, 2, 2)],
        );
        assert_eq!(result.err(), Some(PlanningError::DuplicateTask(1)));

        let result = PDPInstance::new(
            "twice",
            triangle(),
            vec![vehicle(3, 0, 4), vehicle(3, 1, 2)],
            vec![task(1, 0, 1, 1)],
        );
        assert_eq!(result.err(), Some(PlanningError::DuplicateVehicle(3)));
    }

    #[test]
    fn unknown_and_unreachable_cities_are_rejected() {
        let result = PDPInstance::new(
            "unknown",
            triangle(),
            vec![vehicle(1, 0, 4)],
            vec![task(1, 0, 7, 1)],
        );
        assert!(matches!(result, Err(PlanningError::UnknownCity(_))));

        let mut builder = TopologyBuilder::new();
        builder.add_city("A").unwrap();
        builder.add_city("B").unwrap();
        let result = PDPInstance::new(
            "island",
            builder.build(),
            vec![vehicle(1, 0, 4)],
            vec![task(1, 0, 1, 1)],
        );
        assert_eq!(
            result.err(),
            Some(PlanningError::Unreachable {
                from: "A".to_string(),
                to: "B".to_string()
            })
        );
    }

    #[test]
    fn zero_tasks_is_a_valid_instance() {
        let instance =
            PDPInstance::new("idle", triangle(), vec![vehicle(1, 2, 1)], vec![]).unwrap();
        assert_eq!(instance.num_events(), 0);
        assert_eq!(instance.vehicle_slot(0), 0);
    }
}
