use enum_map::EnumMap;
use log::info;
use took::{Timer, Took};

use crate::plan::{materialize, naive_plan, Plan};
use crate::problem::pdp::PDPInstance;
use crate::problem::Num;
use crate::solution::neighborhood::MoveType;
use crate::solution::Assignment;
use crate::solver::local_search::{Parameters, StochasticLocalSearch};
use crate::utils::validator::validate;
use crate::utils::{Countdown, Random};

pub mod acceptance_criterion;
pub mod local_search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    IterationBudget,
    Deadline,
    Cancelled,
}

pub struct SolverResult<'a> {
    /// best assignment seen during the search
    pub assignment: Assignment<'a>,
    pub cost: Num,
    pub initial_cost: Num,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub accepted_moves: EnumMap<MoveType, usize>,
    pub time: Took,
}

/// Per-vehicle plans of one planning call, in fleet order.
pub struct PlanningOutcome<'a> {
    pub plans: Vec<Plan>,
    pub search: Option<SolverResult<'a>>,
    pub time: Took,
}

impl<'a> PlanningOutcome<'a> {
    pub fn total_distance(&self, instance: &PDPInstance) -> Num {
        self.plans
            .iter()
            .map(|plan| plan.total_distance(&instance.topology))
            .sum()
    }

    pub fn total_cost(&self, instance: &PDPInstance) -> Num {
        self.plans
            .iter()
            .zip(instance.vehicles.iter())
            .map(|(plan, vehicle)| plan.cost(vehicle, &instance.topology))
            .sum()
    }

    pub fn iterations(&self) -> usize {
        self.search.as_ref().map_or(0, |result| result.iterations)
    }
}

/// Entry point of a planning call: search, then turn the best assignment into plans.
pub struct CentralizedPlanner;

impl CentralizedPlanner {
    pub fn plan<'a>(
        instance: &'a PDPInstance,
        parameters: Parameters,
        countdown: &Countdown,
        rng: &mut Random,
    ) -> PlanningOutcome<'a> {
        let timer = Timer::new();
        if instance.num_tasks == 0 {
            info!("no tasks, every vehicle stays idle");
            return PlanningOutcome {
                plans: instance.vehicles.iter().map(Plan::empty).collect(),
                search: None,
                time: timer.took(),
            };
        }

        let mut ls = StochasticLocalSearch::with_instance(instance, parameters);
        let result = ls.run(rng, countdown);
        debug_assert!(
            validate(&result.assignment).is_valid(),
            "final assignment violates {:?}",
            validate(&result.assignment).violations()
        );

        let outcome = PlanningOutcome {
            plans: materialize(&result.assignment),
            search: Some(result),
            time: timer.took(),
        };
        info!(
            "planned {} tasks: distance {:.2}, cost {:.2}, took: {}",
            instance.num_tasks,
            outcome.total_distance(instance),
            outcome.total_cost(instance),
            outcome.time
        );
        outcome
    }

    /// Baseline: everything on the first vehicle able to carry the heaviest task.
    pub fn naive<'a>(instance: &'a PDPInstance) -> PlanningOutcome<'a> {
        let timer = Timer::new();
        let heaviest = instance.tasks.iter().map(|t| t.weight).max().unwrap_or(0);
        let chosen = instance
            .vehicles
            .iter()
            .position(|v| v.check_capacity(heaviest))
            .unwrap_or(0);
        let plans = instance
            .vehicles
            .iter()
            .enumerate()
            .map(|(v, vehicle)| {
                if v == chosen {
                    naive_plan(instance, v)
                } else {
                    Plan::empty(vehicle)
                }
            })
            .collect();
        let outcome = PlanningOutcome {
            plans,
            search: None,
            time: timer.took(),
        };
        info!(
            "naive plan on vehicle {}: distance {:.2}, cost {:.2}",
            instance.vehicles[chosen].id,
            outcome.total_distance(instance),
            outcome.total_cost(instance)
        );
        outcome
    }
}
