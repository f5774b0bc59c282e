//! Directly-indexable enumeration of the parameter cartesian product.
//!
//! Scenario indices are 1-based. Parameter 0 varies fastest: the position of
//! parameter `i` for index `n` is `((n - 1) / cumulative_product[i]) % len_i`.
//! Workers claim indices through a shared atomic counter, so each index is
//! handed out exactly once and no other synchronisation is needed.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::{EpochError, Result};
use crate::params::{ExpandedParameterRange, ParameterGrid, ScenarioConfig, scenario};

/// Scenario limit applied in initialisation mode.
pub const INITIALISATION_SCENARIO_LIMIT: u64 = 100;

/// Expands a parameter grid and hands out scenarios by index.
#[derive(Debug)]
pub struct TaskGenerator {
    ranges: Vec<ExpandedParameterRange>,
    base: ScenarioConfig,
    total_scenarios: u64,
    scenario_limit: u64,
    next_index: AtomicU64,
}

impl TaskGenerator {
    /// Builds a generator over `grid`, starting every scenario from the
    /// default [`ScenarioConfig`].
    ///
    /// In initialisation mode [`TaskGenerator::next_task`] stops after
    /// [`INITIALISATION_SCENARIO_LIMIT`] scenarios.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any invalid range or when the
    /// scenario count does not fit in a `u64`.
    pub fn new(grid: &ParameterGrid, initialisation_only: bool) -> Result<Self> {
        Self::with_base(grid, ScenarioConfig::default(), initialisation_only)
    }

    /// Like [`TaskGenerator::new`] with explicit values for parameters the
    /// grid does not mention.
    pub fn with_base(
        grid: &ParameterGrid,
        base: ScenarioConfig,
        initialisation_only: bool,
    ) -> Result<Self> {
        let mut ranges = Vec::with_capacity(grid.ranges.len());
        let mut product: u64 = 1;
        for range in &grid.ranges {
            if scenario::lookup(&range.name).is_none() {
                return Err(EpochError::config(format!(
                    "unknown parameter \"{}\"",
                    range.name
                )));
            }
            let mut expanded = range.expand()?;
            expanded.cumulative_product = product;
            product = product.checked_mul(expanded.len() as u64).ok_or_else(|| {
                EpochError::config(format!(
                    "scenario count overflows at parameter \"{}\"",
                    expanded.name
                ))
            })?;
            ranges.push(expanded);
        }

        let scenario_limit = if initialisation_only {
            product.min(INITIALISATION_SCENARIO_LIMIT)
        } else {
            product
        };
        debug!(
            parameters = ranges.len(),
            total_scenarios = product,
            scenario_limit,
            "task generator built"
        );

        Ok(Self {
            ranges,
            base,
            total_scenarios: product,
            scenario_limit,
            next_index: AtomicU64::new(1),
        })
    }

    /// Size of the full cartesian product, ignoring the initialisation cap.
    pub fn total_scenarios(&self) -> u64 {
        self.total_scenarios
    }

    /// Number of scenarios [`TaskGenerator::next_task`] will hand out.
    pub fn scenario_limit(&self) -> u64 {
        self.scenario_limit
    }

    pub fn ranges(&self) -> &[ExpandedParameterRange] {
        &self.ranges
    }

    /// Builds the scenario at a 1-based `index`. Pure: the same index always
    /// yields an identical config.
    ///
    /// # Errors
    ///
    /// Returns [`EpochError::ScenarioIndex`] when `index` is outside
    /// `[1, total_scenarios]`.
    pub fn get_task(&self, index: u64) -> Result<ScenarioConfig> {
        if index == 0 || index > self.total_scenarios {
            return Err(EpochError::ScenarioIndex {
                index,
                total: self.total_scenarios,
            });
        }

        let mut config = self.base.clone();
        for (range, position) in self.ranges.iter().zip(self.positions(index)) {
            config.set_by_name(&range.name, range.values[position]);
        }
        config.index = index;
        Ok(config)
    }

    /// Per-parameter value positions for an index already checked to lie in
    /// `[1, total_scenarios]`.
    fn positions(&self, index: u64) -> impl Iterator<Item = usize> + '_ {
        let offset = index - 1;
        self.ranges
            .iter()
            .map(move |r| ((offset / r.cumulative_product) % r.len() as u64) as usize)
    }

    #[cfg(test)]
    fn index_of(&self, positions: &[usize]) -> u64 {
        self.ranges
            .iter()
            .zip(positions)
            .map(|(r, &p)| p as u64 * r.cumulative_product)
            .sum::<u64>()
            + 1
    }

    /// Claims the next unclaimed scenario, or `None` once the limit is
    /// reached. Safe to call from any number of threads.
    pub fn next_task(&self) -> Option<ScenarioConfig> {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        if index > self.scenario_limit {
            return None;
        }
        self.get_task(index).ok()
    }
}
