//! Bounded per-objective ranking shared by every sweep worker.
//!
//! All structural state sits behind one lock. Each objective also publishes
//! its current worst-kept and worst-observed values through atomics so that
//! most results can be rejected without locking. A result that passes the
//! optimistic check is always re-validated under the lock before anything
//! changes, so a stale read can cost an extra lock acquisition but never
//! corrupt the ranking.
//!
//! Equal values share one map key and the most recently inserted index is
//! the one evicted first. Which of several tied scenarios survives therefore
//! depends on worker arrival order and is not deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use serde::Serialize;

use crate::sim::SimulationResult;

/// Ranked quantities, in report order. The discriminant is the slot in
/// [`Objective::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Capex,
    AnnualisedCost,
    PaybackHorizon,
    CostBalance,
    CarbonBalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimise,
    Maximise,
}

impl Objective {
    pub const ALL: [Objective; 5] = [
        Objective::Capex,
        Objective::AnnualisedCost,
        Objective::PaybackHorizon,
        Objective::CostBalance,
        Objective::CarbonBalance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Objective::Capex => "capex",
            Objective::AnnualisedCost => "annualised_cost",
            Objective::PaybackHorizon => "payback_horizon",
            Objective::CostBalance => "cost_balance",
            Objective::CarbonBalance => "carbon_balance",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Objective::Capex | Objective::AnnualisedCost | Objective::PaybackHorizon => {
                Direction::Minimise
            }
            Objective::CostBalance | Objective::CarbonBalance => Direction::Maximise,
        }
    }

    pub fn value(self, result: &SimulationResult) -> f64 {
        match self {
            Objective::Capex => result.capex,
            Objective::AnnualisedCost => result.annualised_cost,
            Objective::PaybackHorizon => result.payback_horizon,
            Objective::CostBalance => result.cost_balance,
            Objective::CarbonBalance => result.carbon_balance(),
        }
    }

    /// Ranking key where lower is better in either direction. Negation
    /// keeps NaN as NaN, which [`OrderedFloat`] sorts above every number,
    /// so an undefined value always ranks worst.
    fn score(self, value: f64) -> OrderedFloat<f64> {
        match self.direction() {
            Direction::Minimise => OrderedFloat(value),
            Direction::Maximise => OrderedFloat(-value),
        }
    }

    /// Strictly better. NaN is never better than anything.
    pub fn is_better(self, candidate: f64, than: f64) -> bool {
        self.score(candidate) < self.score(than)
    }

    /// Strictly worse.
    pub fn is_worse(self, candidate: f64, than: f64) -> bool {
        self.is_better(than, candidate)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One ranked scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedEntry {
    pub value: f64,
    pub index: u64,
}

/// Retained scenarios for one objective, best first, plus the worst seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveResults {
    pub objective: Objective,
    pub best: Vec<RankedEntry>,
    pub worst: Option<RankedEntry>,
}

/// Kept entries keyed by [`Objective::score`], so iteration runs best first.
#[derive(Debug, Default)]
struct Ranking {
    kept: BTreeMap<OrderedFloat<f64>, Vec<RankedEntry>>,
    len: usize,
    worst_observed: Option<RankedEntry>,
}

impl Ranking {
    fn worst_kept(&self) -> Option<RankedEntry> {
        self.kept
            .last_key_value()
            .and_then(|(_, entries)| entries.last().copied())
    }

    fn insert(&mut self, objective: Objective, entry: RankedEntry) {
        self.kept
            .entry(objective.score(entry.value))
            .or_default()
            .push(entry);
        self.len += 1;
    }

    fn evict_worst(&mut self) {
        let Some(mut last) = self.kept.last_entry() else {
            return;
        };
        last.get_mut().pop();
        if last.get().is_empty() {
            last.remove();
        }
        self.len -= 1;
    }
}

/// Lock-free view of one objective's thresholds.
#[derive(Debug, Default)]
struct Thresholds {
    kept: AtomicUsize,
    worst_kept: AtomicU64,
    observed: AtomicBool,
    worst_observed: AtomicU64,
}

/// K best scenarios per objective plus the overall worst.
#[derive(Debug)]
pub struct LeagueTable {
    capacity: usize,
    state: Mutex<[Ranking; 5]>,
    thresholds: [Thresholds; 5],
}

impl LeagueTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(Default::default()),
            thresholds: Default::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Offers one result to every objective. Safe to call concurrently.
    pub fn consider_result(&self, result: &SimulationResult) {
        for (slot, objective) in Objective::ALL.into_iter().enumerate() {
            let value = objective.value(result);
            if self.might_change(slot, objective, value) {
                self.update(slot, objective, value, result.index);
            }
        }
    }

    fn might_change(&self, slot: usize, objective: Objective, value: f64) -> bool {
        let t = &self.thresholds[slot];
        let new_worst = !t.observed.load(Ordering::Acquire)
            || objective.is_worse(value, f64::from_bits(t.worst_observed.load(Ordering::Acquire)));
        let kept = t.kept.load(Ordering::Acquire);
        let keepable = self.capacity > 0
            && (kept < self.capacity
                || objective.is_better(value, f64::from_bits(t.worst_kept.load(Ordering::Acquire))));
        new_worst || keepable
    }

    fn update(&self, slot: usize, objective: Objective, value: f64, index: u64) {
        let mut state = self.state.lock();
        let ranking = &mut state[slot];
        let t = &self.thresholds[slot];

        let is_new_worst = ranking
            .worst_observed
            .is_none_or(|w| objective.is_worse(value, w.value));
        if is_new_worst {
            ranking.worst_observed = Some(RankedEntry { value, index });
            t.worst_observed.store(value.to_bits(), Ordering::Release);
            t.observed.store(true, Ordering::Release);
        }

        if self.capacity == 0 {
            return;
        }
        let entry = RankedEntry { value, index };
        if ranking.len < self.capacity {
            ranking.insert(objective, entry);
        } else {
            match ranking.worst_kept() {
                Some(worst) if objective.is_better(value, worst.value) => {
                    ranking.evict_worst();
                    ranking.insert(objective, entry);
                }
                _ => return,
            }
        }

        if let Some(worst) = ranking.worst_kept() {
            t.worst_kept.store(worst.value.to_bits(), Ordering::Release);
        }
        t.kept.store(ranking.len, Ordering::Release);
    }

    /// Retained entries best first, plus the worst observed across every
    /// result offered.
    pub fn get_results_for_objective(&self, objective: Objective) -> ObjectiveResults {
        let slot = objective as usize;
        let state = self.state.lock();
        let ranking = &state[slot];

        let best = ranking.kept.values().flatten().copied().collect();

        ObjectiveResults {
            objective,
            best,
            worst: ranking.worst_observed,
        }
    }

    /// Best entry for `objective`, if any result has been offered.
    pub fn best(&self, objective: Objective) -> Option<RankedEntry> {
        self.get_results_for_objective(objective).best.first().copied()
    }

    /// Sorted, de-duplicated indices retained for any objective, optionally
    /// with each objective's worst-observed index.
    pub fn get_all_results(&self, include_worst: bool) -> Vec<u64> {
        let state = self.state.lock();
        let mut all = BTreeSet::new();
        for ranking in state.iter() {
            all.extend(ranking.kept.values().flatten().map(|e| e.index));
            if include_worst {
                all.extend(ranking.worst_observed.map(|w| w.index));
            }
        }
        all.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::thread;
    use std::time::Duration;

    fn result(index: u64, value: f64) -> SimulationResult {
        SimulationResult {
            index,
            capex: value,
            annualised_cost: value,
            payback_horizon: value,
            cost_balance: value,
            carbon_balance_scope_1: value,
            carbon_balance_scope_2: 0.0,
            baseline_opex: 0.0,
            scenario_opex: 0.0,
            runtime: Duration::ZERO,
            defect: None,
        }
    }

    #[test]
    fn keeps_best_first_per_direction() {
        let table = LeagueTable::new(3);
        for (i, v) in [5.0, 1.0, 9.0, 3.0, 7.0].into_iter().enumerate() {
            table.consider_result(&result(i as u64 + 1, v));
        }

        let capex = table.get_results_for_objective(Objective::Capex);
        let values: Vec<_> = capex.best.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 3.0, 5.0]);
        assert_eq!(capex.worst, Some(RankedEntry { value: 9.0, index: 3 }));

        let balance = table.get_results_for_objective(Objective::CostBalance);
        let values: Vec<_> = balance.best.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![9.0, 7.0, 5.0]);
        assert_eq!(balance.worst, Some(RankedEntry { value: 1.0, index: 2 }));
    }

    #[test]
    fn worst_is_tracked_even_when_never_kept() {
        let table = LeagueTable::new(1);
        table.consider_result(&result(1, 2.0));
        table.consider_result(&result(2, 50.0));
        let capex = table.get_results_for_objective(Objective::Capex);
        assert_eq!(capex.best, vec![RankedEntry { value: 2.0, index: 1 }]);
        assert_eq!(capex.worst.map(|w| w.index), Some(2));
    }

    #[test]
    fn ties_share_a_key_without_exceeding_capacity() {
        let table = LeagueTable::new(2);
        for i in 1..=5 {
            table.consider_result(&result(i, 4.0));
        }
        let capex = table.get_results_for_objective(Objective::Capex);
        assert_eq!(capex.best.len(), 2);
        assert!(capex.best.iter().all(|e| e.value == 4.0));
    }

    #[test]
    fn all_results_deduplicates_across_objectives() {
        let table = LeagueTable::new(2);
        for i in 1..=6 {
            table.consider_result(&result(i, i as f64));
        }
        // Minimised objectives keep {1, 2}, maximised keep {5, 6}.
        assert_eq!(table.get_all_results(false), vec![1, 2, 5, 6]);
        assert_eq!(table.get_all_results(true), vec![1, 2, 5, 6]);
    }

    #[test]
    fn all_results_can_add_worst_outside_the_kept_set() {
        let table = LeagueTable::new(1);
        for i in 1..=3 {
            table.consider_result(&result(i, i as f64));
        }
        assert_eq!(table.get_all_results(false), vec![1, 3]);
        assert_eq!(table.get_all_results(true), vec![1, 3]);

        let mut r = result(4, 2.0);
        r.carbon_balance_scope_1 = -100.0;
        table.consider_result(&r);
        assert_eq!(table.get_all_results(true), vec![1, 3, 4]);
        assert_eq!(table.get_all_results(false), vec![1, 3]);
    }

    #[test]
    fn nan_ranks_worst_in_both_directions() {
        let table = LeagueTable::new(2);
        table.consider_result(&result(1, 100.0));
        table.consider_result(&result(2, f64::NAN));
        table.consider_result(&result(3, 50.0));

        for objective in Objective::ALL {
            let r = table.get_results_for_objective(objective);
            let indices: Vec<u64> = r.best.iter().map(|e| e.index).collect();
            assert!(!indices.contains(&2), "{objective}: {indices:?}");
            assert_eq!(r.worst.map(|w| w.index), Some(2), "{objective}");
        }
        assert_eq!(table.best(Objective::CostBalance).map(|e| e.index), Some(1));
        assert_eq!(table.best(Objective::PaybackHorizon).map(|e| e.index), Some(3));
    }

    #[test]
    fn empty_table_reports_nothing() {
        let table = LeagueTable::new(4);
        assert_eq!(table.best(Objective::Capex), None);
        assert!(table.get_all_results(true).is_empty());
    }

    #[test]
    fn concurrent_submissions_keep_exactly_the_k_best() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 500;
        const K: usize = 10;

        let table = LeagueTable::new(K);
        let submitted: Vec<Vec<(u64, f64)>> = (0..THREADS)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(t);
                (0..PER_THREAD)
                    .map(|i| (t * PER_THREAD + i + 1, rng.random_range(-1e3..1e3)))
                    .collect()
            })
            .collect();

        thread::scope(|s| {
            for batch in &submitted {
                let table = &table;
                s.spawn(move || {
                    for &(index, value) in batch {
                        table.consider_result(&result(index, value));
                    }
                });
            }
        });

        let mut all: Vec<f64> = submitted.iter().flatten().map(|&(_, v)| v).collect();
        all.sort_by(|a, b| a.total_cmp(b));

        for objective in Objective::ALL {
            let r = table.get_results_for_objective(objective);
            assert_eq!(r.best.len(), K);
            let kept: Vec<f64> = r.best.iter().map(|e| e.value).collect();
            let (expected, worst): (Vec<f64>, f64) = match objective.direction() {
                Direction::Minimise => (all[..K].to_vec(), all[all.len() - 1]),
                Direction::Maximise => (all.iter().rev().take(K).copied().collect(), all[0]),
            };
            assert_eq!(kept, expected, "{objective}");
            assert_eq!(r.worst.map(|w| w.value), Some(worst), "{objective}");
        }
    }
}
