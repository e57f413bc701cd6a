use std::fmt::{Display, Formatter};

use fixedbitset::FixedBitSet;

use crate::solution::Assignment;

/// The feasibility rules an [`Assignment`] has to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// no node is its own successor
    NoSelfLoop,
    /// the first event of a vehicle has time 1
    FirstEventTime,
    /// consecutive events have consecutive times and the same owner
    SuccessorConsistency,
    /// the first event of a vehicle is owned by it
    FirstEventOwner,
    /// every event is reached exactly once from the vehicle slots
    Partition,
    /// no chain starts with a delivery
    FirstEventNotDelivery,
    /// the running load never exceeds the vehicle capacity
    Capacity,
    /// pickup and delivery of a task are served by the same vehicle
    SameVehicle,
    /// pickups come before their deliveries
    Precedence,
}

impl Invariant {
    pub const ALL: [Invariant; 9] = [
        Invariant::NoSelfLoop,
        Invariant::FirstEventTime,
        Invariant::SuccessorConsistency,
        Invariant::FirstEventOwner,
        Invariant::Partition,
        Invariant::FirstEventNotDelivery,
        Invariant::Capacity,
        Invariant::SameVehicle,
        Invariant::Precedence,
    ];

    /// 1-based number as used in the documentation of the assignment state.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }
}

impl Display for Invariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (#{})", self, self.number())
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    violated: FixedBitSet,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            violated: FixedBitSet::with_capacity(Invariant::ALL.len()),
        }
    }

    fn flag(&mut self, invariant: Invariant) {
        self.violated.insert(invariant as usize);
    }

    pub fn is_valid(&self) -> bool {
        self.violated.count_ones(..) == 0
    }

    pub fn violates(&self, invariant: Invariant) -> bool {
        self.violated.contains(invariant as usize)
    }

    pub fn violations(&self) -> Vec<Invariant> {
        self.violated.ones().map(|i| Invariant::ALL[i]).collect()
    }

    pub fn assert_valid(&self) {
        assert!(self.is_valid(), "violated invariants: {:?}", self.violations())
    }
}

/// Checks all invariants independently and reports every one that fails.
pub fn validate(assignment: &Assignment) -> ValidationReport {
    let instance = assignment.instance;
    let num_events = instance.num_events();
    let num_nodes = instance.num_nodes();
    let mut report = ValidationReport::new();

    if assignment.next.len() != num_nodes
        || assignment.time.len() != num_events
        || assignment.owner.len() != num_events
    {
        report.flag(Invariant::Partition);
        return report;
    }

    // 1
    if (0..num_nodes).any(|node| assignment.next[node] == Some(node)) {
        report.flag(Invariant::NoSelfLoop);
    }

    for v in 0..instance.num_vehicles {
        if let Some(first) = assignment.first_event(v) {
            if !instance.is_event(first) {
                report.flag(Invariant::Partition);
                continue;
            }
            // 2
            if assignment.time[first] != 1 {
                report.flag(Invariant::FirstEventTime);
            }
            // 4
            if assignment.owner[first] != v {
                report.flag(Invariant::FirstEventOwner);
            }
            // 6
            if instance.is_delivery(first) {
                report.flag(Invariant::FirstEventNotDelivery);
            }
        }
    }

    // 3
    for e1 in 0..num_events {
        if let Some(e2) = assignment.next[e1] {
            if instance.is_event(e2)
                && (assignment.time[e2] != assignment.time[e1] + 1
                    || assignment.owner[e2] != assignment.owner[e1])
            {
                report.flag(Invariant::SuccessorConsistency);
            }
        }
    }

    // 5
    let mut occurrences = vec![0usize; num_nodes];
    let mut terminations = 0;
    for value in assignment.next.iter() {
        match value {
            Some(node) if *node < num_nodes => occurrences[*node] += 1,
            Some(_) => report.flag(Invariant::Partition),
            None => terminations += 1,
        }
    }
    let each_event_once = occurrences[..num_events].iter().all(|&c| c == 1);
    let no_slot_as_successor = occurrences[num_events..].iter().all(|&c| c == 0);
    if !each_event_once || !no_slot_as_successor || terminations != instance.num_vehicles {
        report.flag(Invariant::Partition);
    }
    let mut reached = FixedBitSet::with_capacity(num_events);
    for v in 0..instance.num_vehicles {
        let mut current = assignment.first_event(v);
        while let Some(event) = current {
            if !instance.is_event(event) || reached.put(event) {
                report.flag(Invariant::Partition);
                break;
            }
            current = assignment.next[event];
        }
    }
    if reached.count_ones(..) != num_events {
        report.flag(Invariant::Partition);
    }

    // 7
    for (v, vehicle) in instance.vehicles.iter().enumerate() {
        let mut load: i64 = 0;
        for event in assignment.iter_route(v) {
            load += instance.demand_of(event);
            if load > vehicle.capacity as i64 {
                report.flag(Invariant::Capacity);
                break;
            }
        }
    }

    for pickup in instance.iter_pickups() {
        let delivery = instance.pair_of(pickup);
        // 8
        if assignment.owner[pickup] != assignment.owner[delivery] {
            report.flag(Invariant::SameVehicle);
        }
        // 9
        if assignment.time[pickup] >= assignment.time[delivery] {
            report.flag(Invariant::Precedence);
        }
    }

    report
}
