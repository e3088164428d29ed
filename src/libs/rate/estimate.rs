use super::table::{Grid3, RunTables};
use crate::libs::phylo::PhyloError;
use crate::libs::subst::Model;
use nalgebra::DMatrix;

/// Substitution types, or the groups pooling them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Type,
    Group,
}

/// Rate of `count` changes over `exposure`, and its within-iteration variance.
///
/// Both are 0 when there is no exposure.
pub fn rate_and_variance(count: f64, exposure: f64) -> (f64, f64) {
    if exposure > 0.0 {
        let theta = count / exposure;
        (theta, theta / exposure)
    } else {
        (0.0, 0.0)
    }
}

/// Per-iteration rates of every kind, branch and iteration
fn estimate_grid(
    counts: &Grid3,
    proportions: &Grid3,
    exposure_of: impl Fn(usize) -> &'static [usize],
    unexposed: &mut usize,
) -> (Grid3, Grid3) {
    let (n_kinds, n_branches, n_iters) = counts.shape();
    let mut theta = Grid3::new(n_kinds, n_branches, n_iters);
    let mut theta_var = Grid3::new(n_kinds, n_branches, n_iters);

    for k in 0..n_kinds {
        let states = exposure_of(k);
        for l in 0..n_branches {
            for c in 0..n_iters {
                let count = counts.get(k, l, c);
                let exposure: f64 = states.iter().map(|&s| proportions.get(s, l, c)).sum();
                if count > 0.0 && exposure <= 0.0 {
                    *unexposed += 1;
                }
                let (t, v) = rate_and_variance(count, exposure);
                theta.set(k, l, c, t);
                theta_var.set(k, l, c, v);
            }
        }
    }
    (theta, theta_var)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn row_means(grid: &Grid3) -> Vec<Vec<f64>> {
    let (n_kinds, n_branches, _) = grid.shape();
    (0..n_kinds)
        .map(|k| (0..n_branches).map(|l| mean(grid.row(k, l))).collect())
        .collect()
}

/// Branch-by-branch covariance of kind `k` across iterations.
///
/// The diagonal adds the mean within-iteration variance to the sample variance of
/// the rates. Off-diagonal entries are the plain sample covariance. With fewer than
/// two iterations the sample terms are 0.
pub fn covariance(theta: &Grid3, theta_var: &Grid3, k: usize) -> DMatrix<f64> {
    let (_, n_branches, n_iters) = theta.shape();
    let bars: Vec<f64> = (0..n_branches).map(|l| mean(theta.row(k, l))).collect();
    let dof = n_iters.saturating_sub(1) as f64;

    DMatrix::from_fn(n_branches, n_branches, |l, m| {
        let sample = if n_iters < 2 {
            0.0
        } else if l == m {
            theta
                .row(k, l)
                .iter()
                .map(|x| (x - bars[l]).powi(2))
                .sum::<f64>()
                / dof
        } else {
            let cross: f64 = theta
                .row(k, l)
                .iter()
                .zip(theta.row(k, m))
                .map(|(x, y)| x * y)
                .sum();
            (cross - n_iters as f64 * bars[l] * bars[m]) / dof
        };

        if l == m {
            sample + mean(theta_var.row(k, l))
        } else {
            sample
        }
    })
}

/// Rate estimates of a finished run.
#[derive(Debug, Clone)]
pub struct Estimates {
    pub model: Model,
    /// `[type][branch][iteration]`
    pub theta: Grid3,
    pub theta_var: Grid3,
    /// `[group][branch][iteration]`
    pub theta_ss: Grid3,
    pub theta_ss_var: Grid3,
    /// Means over iterations, `[type][branch]`
    pub theta_bar: Vec<Vec<f64>>,
    /// Means over iterations, `[group][branch]`
    pub theta_ss_bar: Vec<Vec<f64>>,
}

impl Estimates {
    pub fn from_tables(tables: &RunTables) -> Self {
        let model = tables.model;
        let mut unexposed = 0;

        let (theta, theta_var) = estimate_grid(
            &tables.counts,
            &tables.proportions,
            |t| model.type_exposure(t),
            &mut unexposed,
        );
        let (theta_ss, theta_ss_var) = estimate_grid(
            &tables.group_counts,
            &tables.proportions,
            |g| model.group_exposure(g),
            &mut unexposed,
        );
        if unexposed > 0 {
            log::warn!(
                "{} rate cells have changes but no exposure; their rates are set to 0",
                unexposed
            );
        }

        Self {
            model,
            theta_bar: row_means(&theta),
            theta_ss_bar: row_means(&theta_ss),
            theta,
            theta_var,
            theta_ss,
            theta_ss_var,
        }
    }

    pub fn n_kinds(&self, variant: Variant) -> usize {
        match variant {
            Variant::Type => self.model.n_types(),
            Variant::Group => self.model.n_groups(),
        }
    }

    /// Iteration-averaged rate of every branch
    pub fn rates(&self, k: usize, variant: Variant) -> Result<&[f64], PhyloError> {
        let bars = match variant {
            Variant::Type => &self.theta_bar,
            Variant::Group => &self.theta_ss_bar,
        };
        bars.get(k)
            .map(Vec::as_slice)
            .ok_or_else(|| self.out_of_range(k, variant))
    }

    /// Branch-by-branch covariance matrix of type (or group) `k`
    pub fn covariance(&self, k: usize, variant: Variant) -> Result<DMatrix<f64>, PhyloError> {
        if k >= self.n_kinds(variant) {
            return Err(self.out_of_range(k, variant));
        }
        Ok(match variant {
            Variant::Type => covariance(&self.theta, &self.theta_var, k),
            Variant::Group => covariance(&self.theta_ss, &self.theta_ss_var, k),
        })
    }

    fn out_of_range(&self, k: usize, variant: Variant) -> PhyloError {
        PhyloError::LogicError(format!(
            "{:?} {} out of range, the model has {}",
            variant,
            k,
            self.n_kinds(variant)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_of(rows: &[&[f64]]) -> Grid3 {
        let mut grid = Grid3::new(1, rows.len(), rows[0].len());
        for (l, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                grid.set(0, l, c, v);
            }
        }
        grid
    }

    #[test]
    fn test_rate_zero_guard() {
        assert_eq!(rate_and_variance(0.0, 0.0), (0.0, 0.0));
        assert_eq!(rate_and_variance(3.0, 0.0), (0.0, 0.0));
        assert_eq!(rate_and_variance(3.0, 2.0), (1.5, 0.75));
    }

    #[test]
    fn test_covariance_two_iterations() {
        let theta = grid_of(&[&[1.0, 3.0], &[2.0, 6.0]]);
        let var = grid_of(&[&[0.5, 0.1], &[0.0, 0.2]]);
        let m = covariance(&theta, &var, 0);

        // ((1-2)^2 + (3-2)^2) / 1 + mean(0.5, 0.1)
        assert_relative_eq!(m[(0, 0)], 2.0 + 0.3);
        assert_relative_eq!(m[(1, 1)], 8.0 + 0.1);
        // (1*2 + 3*6 - 2 * 2 * 4) / 1
        assert_relative_eq!(m[(0, 1)], 4.0);
        assert_relative_eq!(m[(1, 0)], 4.0);
    }

    #[test]
    fn test_covariance_single_iteration() {
        let theta = grid_of(&[&[1.0], &[2.0]]);
        let var = grid_of(&[&[0.5], &[0.25]]);
        let m = covariance(&theta, &var, 0);
        assert_eq!(m[(0, 0)], 0.5);
        assert_eq!(m[(1, 1)], 0.25);
        assert_eq!(m[(0, 1)], 0.0);
    }

    #[test]
    fn test_estimates_from_tables() {
        let mut tables = RunTables::new(Model::Single, 1, 2);
        // A->G: 2 changes, A occupies half the branch in one site
        tables.counts.set(0, 0, 0, 2.0);
        tables.proportions.set(0, 0, 0, 0.5);
        // no exposure at iteration 1: guarded to 0
        tables.counts.set(0, 0, 1, 1.0);
        // A->G,T->C group pools A and T
        tables.group_counts.set(5, 0, 0, 2.0);
        tables.proportions.set(3, 0, 0, 0.5);

        let est = Estimates::from_tables(&tables);
        assert_eq!(est.theta.row(0, 0), &[4.0, 0.0]);
        assert_eq!(est.theta_var.row(0, 0), &[8.0, 0.0]);
        assert_eq!(est.theta_bar[0], vec![2.0]);
        assert_eq!(est.theta_ss.row(5, 0), &[2.0, 0.0]);
        assert_eq!(est.theta_ss_bar[5], vec![1.0]);

        let m = est.covariance(0, Variant::Type).unwrap();
        assert_relative_eq!(m[(0, 0)], 8.0 + 4.0);
        assert!(m.iter().all(|v| v.is_finite()));

        assert_eq!(est.rates(5, Variant::Group).unwrap(), &[1.0]);
        assert!(est.covariance(12, Variant::Type).is_err());
        assert!(est.covariance(6, Variant::Group).is_err());
        assert!(est.rates(9, Variant::Group).is_err());
    }
}
