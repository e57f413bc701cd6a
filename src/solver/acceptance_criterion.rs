use num_traits::Inv;
use rand::Rng;

use crate::problem::Num;
use crate::utils::Random;

pub const DEFAULT_CONSERVATIVE_RATE: f64 = 0.4;
/// lower bound for both ends of the cooling schedule
pub const MIN_TEMPERATURE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptanceCriterionStrategy {
    /// move to the best candidate with probability `1 - rate`, otherwise stay
    Conservative { rate: f64 },
    ExponentialMetropolis {
        initial_temperature: f64,
        final_temperature: f64,
    },
}

impl Default for AcceptanceCriterionStrategy {
    fn default() -> Self {
        Self::Conservative {
            rate: DEFAULT_CONSERVATIVE_RATE,
        }
    }
}

/// Decides whether the search moves to the best non-trivial neighbor or keeps its current state.
pub trait AcceptanceCriterion: Clone {
    fn update(&mut self, num_iterations: usize);
    fn check_aspiration_criterion(
        &self,
        new_solution_objective: Num,
        best_solution_objective: Num,
        current_solution_objective: Num,
        rng: &mut Random,
    ) -> bool;

    fn get_current_temperature(&self) -> f64;
}

#[derive(Clone)]
pub struct ConservativeCriterion {
    rate: f64,
}

impl ConservativeCriterion {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl AcceptanceCriterion for ConservativeCriterion {
    fn update(&mut self, _num_iterations: usize) {}
    fn check_aspiration_criterion(
        &self,
        new_solution_objective: Num,
        _best_solution_objective: Num,
        current_solution_objective: Num,
        rng: &mut Random,
    ) -> bool {
        // a worse move is never the best candidate, staying is
        new_solution_objective <= current_solution_objective
            && rng.gen_range(0.0..1.0f64) >= self.rate
    }
    fn get_current_temperature(&self) -> f64 {
        self.rate
    }
}

#[derive(Clone)]
pub struct ExponentialMetropolisCriteria {
    current_temperature: f64,
    exponential_cooling_factor: f64,
}

impl ExponentialMetropolisCriteria {
    pub fn new(initial_temperature: f64, final_temperature: f64, num_iterations: usize) -> Self {
        let initial_temperature = initial_temperature.max(MIN_TEMPERATURE);
        let final_temperature = final_temperature.max(MIN_TEMPERATURE);
        Self {
            exponential_cooling_factor: (final_temperature / initial_temperature)
                .powf((num_iterations.max(1) as f64).inv()),
            current_temperature: initial_temperature,
        }
    }
}

impl AcceptanceCriterion for ExponentialMetropolisCriteria {
    fn update(&mut self, num_iterations: usize) {
        self.current_temperature *= self.exponential_cooling_factor.powi(num_iterations as i32);
    }
    fn check_aspiration_criterion(
        &self,
        new_solution_objective: Num,
        _best_solution_objective: Num,
        current_solution_objective: Num,
        rng: &mut Random,
    ) -> bool {
        new_solution_objective
            < (current_solution_objective
                - self.current_temperature * (rng.gen_range(0.0..=1.0f64).ln()))
    }
    fn get_current_temperature(&self) -> f64 {
        self.current_temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::create_seeded_rng;

    #[test]
    fn zero_rate_accepts_every_non_worsening_move() {
        let criterion = ConservativeCriterion::new(0.0);
        let mut rng = create_seeded_rng(1);
        for _ in 0..100 {
            assert!(criterion.check_aspiration_criterion(9.0, 9.0, 10.0, &mut rng));
            assert!(criterion.check_aspiration_criterion(10.0, 9.0, 10.0, &mut rng));
            assert!(!criterion.check_aspiration_criterion(10.5, 9.0, 10.0, &mut rng));
        }
    }

    #[test]
    fn full_rate_always_stays() {
        let criterion = ConservativeCriterion::new(1.0);
        let mut rng = create_seeded_rng(2);
        for _ in 0..100 {
            assert!(!criterion.check_aspiration_criterion(1.0, 1.0, 10.0, &mut rng));
        }
    }

    #[test]
    fn conservative_rate_is_the_refusal_frequency() {
        let criterion = ConservativeCriterion::new(DEFAULT_CONSERVATIVE_RATE);
        let mut rng = create_seeded_rng(3);
        let accepted = (0..10_000)
            .filter(|_| criterion.check_aspiration_criterion(1.0, 1.0, 2.0, &mut rng))
            .count();
        assert!((5_500..6_500).contains(&accepted), "accepted {}", accepted);
    }

    #[test]
    fn metropolis_cools_down_to_final_temperature() {
        let mut criterion = ExponentialMetropolisCriteria::new(10.0, 0.1, 100);
        criterion.update(100);
        assert!((criterion.get_current_temperature() - 0.1).abs() < 1e-6);

        let mut rng = create_seeded_rng(4);
        assert!(criterion.check_aspiration_criterion(5.0, 5.0, 6.0, &mut rng));
    }

    #[test]
    fn degenerate_temperatures_are_clamped() {
        for (initial, last) in [(0.0, 0.1), (10.0, 0.0), (0.0, 0.0), (-1.0, f64::NAN)] {
            let mut criterion = ExponentialMetropolisCriteria::new(initial, last, 50);
            criterion.update(50);
            let temperature = criterion.get_current_temperature();
            assert!(temperature.is_finite() && temperature > 0.0, "{} -> {}", initial, temperature);
        }

        let criterion = ExponentialMetropolisCriteria::new(0.0, 0.0, 10);
        let mut rng = create_seeded_rng(5);
        assert!(criterion.check_aspiration_criterion(4.0, 4.0, 5.0, &mut rng));
        assert!(!criterion.check_aspiration_criterion(6.0, 4.0, 5.0, &mut rng));
    }
}
