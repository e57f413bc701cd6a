#[cfg(test)]
use std::fmt::Debug;
#[cfg(feature = "progressbar")]
use std::io::Stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use took::Timer;

use crate::problem::Num;

pub mod logging;
pub mod validator;

pub trait Tolerance {
    fn tol() -> Self;
}

impl Tolerance for Num {
    fn tol() -> Self {
        0.001
    }
}

pub type Random = Pcg64Mcg;

pub fn create_seeded_rng(seed: i128) -> Random {
    let mut rng = Pcg64Mcg::from_seed(seed.to_le_bytes());
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeLimit {
    Milliseconds(u64),
    None,
}

impl TimeLimit {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
    /// The tighter of two limits.
    pub fn min(self, other: TimeLimit) -> TimeLimit {
        match (self, other) {
            (Self::None, other) => other,
            (this, Self::None) => this,
            (Self::Milliseconds(a), Self::Milliseconds(b)) => Self::Milliseconds(a.min(b)),
        }
    }
}

/// Wall-clock budget plus an optional cooperative cancellation flag.
pub struct Countdown<'a> {
    start: Timer,
    time_limit: TimeLimit,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Countdown<'a> {
    pub fn new(start: Timer, limit: TimeLimit) -> Self {
        Self {
            start,
            time_limit: limit,
            cancel: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            start: Timer::new(),
            time_limit: TimeLimit::None,
            cancel: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    pub fn time_remaining(&self) -> u64 {
        if let TimeLimit::Milliseconds(value) = self.time_limit {
            let duration = self.time_elapsed().as_millis() as u64;
            value.saturating_sub(duration)
        } else {
            u64::MAX
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.time_remaining() == 0
    }

    pub fn time_elapsed(&self) -> Duration {
        self.start.took().into_std()
    }
}

pub trait SearchProgressIterationTracker {
    fn update(&mut self, best: Option<Num>, current: Option<Num>);
    fn inc(&mut self);
}

pub struct DisabledSearchTracker {}

impl DisabledSearchTracker {
    pub fn new(_total: u64) -> Self {
        Self {}
    }
}

impl SearchProgressIterationTracker for DisabledSearchTracker {
    fn update(&mut self, _: Option<Num>, _: Option<Num>) {}
    fn inc(&mut self) {}
}

#[cfg(feature = "progressbar")]
pub struct PBRSearchTracker {
    progressbar: pbr::ProgressBar<Stdout>,
}

#[cfg(feature = "progressbar")]
impl PBRSearchTracker {
    pub fn new(total: u64) -> Self {
        Self {
            progressbar: pbr::ProgressBar::new(total),
        }
    }
}

#[cfg(feature = "progressbar")]
impl Drop for PBRSearchTracker {
    fn drop(&mut self) {
        self.progressbar.finish_println("");
    }
}

#[cfg(feature = "progressbar")]
impl SearchProgressIterationTracker for PBRSearchTracker {
    fn update(&mut self, best: Option<Num>, current: Option<Num>) {
        self.progressbar.message(
            format!(
                "best {} | current {} | ",
                best.map(|it| format!("{:.2}", it))
                    .unwrap_or("-".to_string()),
                current
                    .map(|it| format!("{:.2}", it))
                    .unwrap_or("-".to_string())
            )
            .as_str(),
        );
    }

    fn inc(&mut self) {
        self.progressbar.inc();
    }
}

#[cfg(feature = "progressbar")]
pub type DefaultSearchTracker = PBRSearchTracker;

#[cfg(not(feature = "progressbar"))]
pub type DefaultSearchTracker = DisabledSearchTracker;

#[cfg(test)]
pub fn assert_vec_eq<T: PartialEq + Debug>(expect: &Vec<T>, actual: &Vec<T>) {
    assert_eq!(
        expect.len(),
        actual.len(),
        "sizes of the vecs differ (expect: {}, actual: {})",
        expect.len(),
        actual.len()
    );
    for (idx, (x, y)) in expect.iter().zip(actual.iter()).enumerate() {
        assert_eq!(
            x, y,
            "vecs differ at index {} ({:?} != {:?})\n expect: {:?}\n actual: {:?}",
            idx, x, y, &expect, &actual
        );
    }
}
