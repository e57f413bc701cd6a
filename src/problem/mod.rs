use thiserror::Error;

pub mod pdp;
pub mod topology;

pub type Num = f64;

pub type CityId = usize;
pub type TaskId = usize;
pub type NodeId = usize;

pub type Capacity = u32;

/// Configuration-level failures surfaced to the caller of a planning call.
#[derive(Debug, Error, PartialEq)]
pub enum PlanningError {
    #[error("the fleet is empty, nothing can be planned")]
    EmptyFleet,
    #[error("task {task} weighs {weight} which exceeds every vehicle capacity (max {max_capacity})")]
    InfeasibleTask {
        task: TaskId,
        weight: Capacity,
        max_capacity: Capacity,
    },
    #[error("task id {0} is used more than once")]
    DuplicateTask(usize),
    #[error("vehicle id {0} is used more than once")]
    DuplicateVehicle(usize),
    #[error("unknown city {0}")]
    UnknownCity(String),
    #[error("city {from} cannot reach city {to}")]
    Unreachable { from: String, to: String },
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}
