use enum_map::EnumMap;
use log::{debug, info, trace};
use took::Timer;

use crate::problem::pdp::PDPInstance;
use crate::problem::Num;
use crate::solution::construction::build_initial_solution;
use crate::solution::cost::total_distance;
use crate::solution::neighborhood::{MoveType, Neighborhood};
use crate::solution::Assignment;
use crate::solver::acceptance_criterion::{
    AcceptanceCriterion, AcceptanceCriterionStrategy, ConservativeCriterion,
    ExponentialMetropolisCriteria,
};
use crate::solver::{SolverResult, StopReason};
use crate::utils::logging::format_log_method_assignment_timed;
#[cfg(feature = "search_assertions")]
use crate::utils::validator::validate;
use crate::utils::{
    Countdown, DefaultSearchTracker, Random, SearchProgressIterationTracker, Tolerance,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub max_iterations: usize,
    pub acceptance: AcceptanceCriterionStrategy,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            acceptance: AcceptanceCriterionStrategy::default(),
        }
    }
}

/// Iterated neighborhood search over [`Assignment`]s that remembers the best state it has seen.
pub struct StochasticLocalSearch<'a> {
    instance: &'a PDPInstance,
    params: Parameters,
    neighborhood: Neighborhood,
}

impl<'a> StochasticLocalSearch<'a> {
    pub fn with_instance(instance: &'a PDPInstance, params: Parameters) -> Self {
        Self {
            instance,
            params,
            neighborhood: Neighborhood::new(),
        }
    }

    pub fn run(&mut self, rng: &mut Random, countdown: &Countdown) -> SolverResult<'a> {
        let initial = build_initial_solution(self.instance, rng);
        self.run_with_assignment(initial, rng, countdown)
    }

    pub fn run_with_assignment(
        &mut self,
        initial: Assignment<'a>,
        rng: &mut Random,
        countdown: &Countdown,
    ) -> SolverResult<'a> {
        let max_iterations = self.params.max_iterations;
        match self.params.acceptance {
            AcceptanceCriterionStrategy::Conservative { rate } => self.search(
                initial,
                ConservativeCriterion::new(rate),
                rng,
                countdown,
            ),
            AcceptanceCriterionStrategy::ExponentialMetropolis {
                initial_temperature,
                final_temperature,
            } => self.search(
                initial,
                ExponentialMetropolisCriteria::new(
                    initial_temperature,
                    final_temperature,
                    max_iterations,
                ),
                rng,
                countdown,
            ),
        }
    }

    fn search(
        &mut self,
        initial: Assignment<'a>,
        mut acceptance_criterion: impl AcceptanceCriterion,
        rng: &mut Random,
        countdown: &Countdown,
    ) -> SolverResult<'a> {
        let timer = Timer::new();
        let mut current = initial;
        let mut current_cost = total_distance(&current);
        let initial_cost = current_cost;
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut accepted_moves: EnumMap<MoveType, usize> = EnumMap::default();

        info!(
            "local search on {} tasks / {} vehicles: initial distance {:.2}, {} iterations, temperature {}, time limit {:?}",
            self.instance.num_tasks,
            self.instance.num_vehicles,
            initial_cost,
            self.params.max_iterations,
            acceptance_criterion.get_current_temperature(),
            countdown.time_limit()
        );

        let mut pb = DefaultSearchTracker::new(self.params.max_iterations as u64);
        pb.update(Some(best_cost), Some(current_cost));

        let mut iteration = 0;
        let stop_reason = loop {
            if iteration >= self.params.max_iterations {
                break StopReason::IterationBudget;
            }
            if countdown.is_cancelled() {
                break StopReason::Cancelled;
            }
            if countdown.is_finished() {
                break StopReason::Deadline;
            }

            let move_type = self.step(
                &mut current,
                &mut current_cost,
                best_cost,
                &acceptance_criterion,
                rng,
            );
            accepted_moves[move_type] += 1;
            acceptance_criterion.update(1);

            #[cfg(feature = "search_assertions")]
            validate(&current).assert_valid();

            if current_cost < best_cost - Num::tol() {
                debug!(
                    "new best distance {:.2} at iteration {} ({:?})",
                    current_cost, iteration, move_type
                );
                best = current.clone();
                best_cost = current_cost;
                pb.update(Some(best_cost), Some(current_cost));
            }
            trace!(
                "iteration {}: {:?}, current {:.2}, best {:.2}",
                iteration,
                move_type,
                current_cost,
                best_cost
            );
            pb.inc();
            iteration += 1;
        };

        let time = timer.took();
        info!(
            "{} (initial {:.2}), {} candidates discarded",
            format_log_method_assignment_timed(
                &format!("local search stopped ({stop_reason:?}) after {iteration} iterations"),
                &best,
                timer.took()
            ),
            initial_cost,
            self.neighborhood.num_discarded(),
        );

        SolverResult {
            assignment: best,
            cost: best_cost,
            initial_cost,
            iterations: iteration,
            stop_reason,
            accepted_moves,
            time,
        }
    }

    /// One iteration: picks the cheapest non-trivial neighbor and lets the acceptance criterion
    /// decide between moving there and staying. Returns what was done.
    pub(crate) fn step(
        &mut self,
        current: &mut Assignment<'a>,
        current_cost: &mut Num,
        best_cost: Num,
        acceptance_criterion: &impl AcceptanceCriterion,
        rng: &mut Random,
    ) -> MoveType {
        let mut candidates = self.neighborhood.generate(current, rng);

        // the unchanged state sits at index 0; ties go to the earliest move
        let best_move = candidates
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, candidate)| (idx, total_distance(&candidate.assignment)))
            .fold(None, |min: Option<(usize, Num)>, (idx, cost)| match min {
                Some((_, min_cost)) if min_cost <= cost => min,
                _ => Some((idx, cost)),
            });

        match best_move {
            Some((idx, cost))
                if acceptance_criterion.check_aspiration_criterion(
                    cost,
                    best_cost,
                    *current_cost,
                    rng,
                ) =>
            {
                let candidate = candidates.swap_remove(idx);
                *current = candidate.assignment;
                *current_cost = cost;
                MoveType::from(&candidate.mv)
            }
            _ => MoveType::None,
        }
    }
}
