//! Fixed-length per-timestep series used throughout the simulation pipeline.

use std::ops::Index;

/// One value per timestep for a single quantity (kW unless noted).
///
/// Every series in one simulation has the same length as the historical
/// data it was derived from. Arithmetic helpers assume equal lengths and
/// operate element-wise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YearTs(Vec<f64>);

impl YearTs {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, t: usize) -> f64 {
        self.0[t]
    }

    pub fn set(&mut self, t: usize, value: f64) {
        self.0[t] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest value, floored at zero.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Adds `k * other` in place.
    pub fn add_scaled(&mut self, other: &[f64], k: f64) {
        for (a, b) in self.0.iter_mut().zip(other) {
            *a += k * b;
        }
    }

    /// Adds a constant to every timestep.
    pub fn add_constant(&mut self, k: f64) {
        for a in &mut self.0 {
            *a += k;
        }
    }

    pub fn sub(&self, other: &YearTs) -> YearTs {
        self.zip_map(other, |a, b| a - b)
    }

    pub fn scaled(&self, k: f64) -> YearTs {
        YearTs(self.0.iter().map(|v| v * k).collect())
    }

    pub fn zip_map(&self, other: &YearTs, f: impl Fn(f64, f64) -> f64) -> YearTs {
        YearTs(self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect())
    }

    /// Energy-weighted sum: Σ value(t) × rate(t) × Δt.
    pub fn dot_energy(&self, rate: &[f64], dt_hours: f64) -> f64 {
        self.0.iter().zip(rate).map(|(v, r)| v * r * dt_hours).sum()
    }
}

impl Index<usize> for YearTs {
    type Output = f64;

    fn index(&self, t: usize) -> &f64 {
        &self.0[t]
    }
}

impl FromIterator<f64> for YearTs {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_scaled_and_sub() {
        let mut a = YearTs::zeros(3);
        a.add_scaled(&[1.0, 2.0, 3.0], 2.0);
        a.add_constant(1.0);
        assert_eq!(a.as_slice(), &[3.0, 5.0, 7.0]);

        let b = YearTs::from_vec(vec![1.0, 1.0, 1.0]);
        assert_eq!(a.sub(&b).as_slice(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_sum_and_max() {
        let a = YearTs::from_vec(vec![-2.0, 4.0, 1.0]);
        assert_eq!(a.sum(), 3.0);
        assert_eq!(a.max(), 4.0);
        assert_eq!(YearTs::from_vec(vec![-1.0]).max(), 0.0);
    }

    #[test]
    fn test_dot_energy_applies_dt() {
        let power = YearTs::from_vec(vec![10.0, 20.0]);
        assert_eq!(power.dot_energy(&[0.5, 1.0], 0.5), 12.5);
    }
}
