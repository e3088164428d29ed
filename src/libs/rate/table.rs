use crate::libs::phylo::PhyloError;
use crate::libs::subst::{BranchStats, Model};

/// Dense `[kind][branch][iteration]` array of f64.
///
/// Iterations of one (kind, branch) cell are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3 {
    n_kinds: usize,
    n_branches: usize,
    n_iters: usize,
    data: Vec<f64>,
}

impl Grid3 {
    pub fn new(n_kinds: usize, n_branches: usize, n_iters: usize) -> Self {
        Self {
            n_kinds,
            n_branches,
            n_iters,
            data: vec![0.0; n_kinds * n_branches * n_iters],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_kinds, self.n_branches, self.n_iters)
    }

    fn index(&self, k: usize, l: usize, c: usize) -> usize {
        (k * self.n_branches + l) * self.n_iters + c
    }

    pub fn get(&self, k: usize, l: usize, c: usize) -> f64 {
        self.data[self.index(k, l, c)]
    }

    pub fn set(&mut self, k: usize, l: usize, c: usize, value: f64) {
        let i = self.index(k, l, c);
        self.data[i] = value;
    }

    pub fn add(&mut self, k: usize, l: usize, c: usize, value: f64) {
        let i = self.index(k, l, c);
        self.data[i] += value;
    }

    /// Values of one (kind, branch) cell across iterations
    pub fn row(&self, k: usize, l: usize) -> &[f64] {
        let start = self.index(k, l, 0);
        &self.data[start..start + self.n_iters]
    }

    /// Element-wise sum
    pub fn merge(&mut self, other: &Grid3) -> Result<(), PhyloError> {
        if self.shape() != other.shape() {
            return Err(PhyloError::LogicError(format!(
                "Cannot merge tables of shapes {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }
}

/// Aggregates of one run, summed over sites (or windows).
#[derive(Debug, Clone, PartialEq)]
pub struct RunTables {
    pub model: Model,
    /// Changes per `[type][branch][iteration]`
    pub counts: Grid3,
    /// Changes per `[group][branch][iteration]`
    pub group_counts: Grid3,
    /// Time per `[state][branch][iteration]`
    pub occupancy: Grid3,
    /// Time over branch length per `[state][branch][iteration]`
    pub proportions: Grid3,
    /// Branch lengths per `[branch][iteration]`, from the latest site folded
    pub branch_lengths: Vec<Vec<f64>>,
    /// Number of sites (or windows) folded in
    pub sites: usize,
}

impl RunTables {
    pub fn new(model: Model, n_branches: usize, n_iters: usize) -> Self {
        Self {
            model,
            counts: Grid3::new(model.n_types(), n_branches, n_iters),
            group_counts: Grid3::new(model.n_groups(), n_branches, n_iters),
            occupancy: Grid3::new(model.n_states(), n_branches, n_iters),
            proportions: Grid3::new(model.n_states(), n_branches, n_iters),
            branch_lengths: vec![vec![0.0; n_iters]; n_branches],
            sites: 0,
        }
    }

    pub fn n_branches(&self) -> usize {
        self.branch_lengths.len()
    }

    pub fn n_iters(&self) -> usize {
        self.counts.shape().2
    }

    /// Add one sample's branch summaries into iteration `c`.
    /// Branch lengths are assigned, not summed.
    pub fn fold(&mut self, c: usize, stats: &[BranchStats]) -> Result<(), PhyloError> {
        if stats.len() != self.n_branches() || c >= self.n_iters() {
            return Err(PhyloError::LogicError(format!(
                "Sample with {} branches at iteration {} does not fit tables of {} branches and {} iterations",
                stats.len(),
                c,
                self.n_branches(),
                self.n_iters()
            )));
        }

        for (l, s) in stats.iter().enumerate() {
            for (t, &n) in s.counts.iter().enumerate() {
                self.counts.add(t, l, c, n as f64);
            }
            for (g, &n) in s.group_counts.iter().enumerate() {
                self.group_counts.add(g, l, c, n as f64);
            }
            for (k, (&time, prop)) in s.occupancy.iter().zip(s.proportions()).enumerate() {
                self.occupancy.add(k, l, c, time);
                self.proportions.add(k, l, c, prop);
            }
            self.branch_lengths[l][c] = s.length;
        }
        Ok(())
    }

    /// Sum two partial tables. Branch lengths come from `other` when it holds any site,
    /// so merging in site order keeps those of the last site.
    pub fn merge(mut self, other: RunTables) -> Result<Self, PhyloError> {
        if self.model != other.model {
            return Err(PhyloError::LogicError(
                "Cannot merge tables of different models".to_string(),
            ));
        }
        self.counts.merge(&other.counts)?;
        self.group_counts.merge(&other.group_counts)?;
        self.occupancy.merge(&other.occupancy)?;
        self.proportions.merge(&other.proportions)?;
        if other.sites > 0 {
            self.branch_lengths = other.branch_lengths;
        }
        self.sites += other.sites;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(model: Model, count: usize, time: f64, length: f64) -> BranchStats {
        let mut s = BranchStats::new(model);
        s.counts[0] = count;
        s.group_counts[0] = count;
        s.occupancy[0] = time;
        s.length = length;
        s
    }

    #[test]
    fn test_grid3_layout() {
        let mut grid = Grid3::new(2, 3, 4);
        grid.set(1, 2, 3, 5.0);
        grid.add(1, 2, 3, 1.0);
        grid.add(1, 2, 0, 2.0);
        assert_eq!(grid.get(1, 2, 3), 6.0);
        assert_eq!(grid.row(1, 2), &[2.0, 0.0, 0.0, 6.0]);
        assert_eq!(grid.row(0, 0), &[0.0; 4]);

        assert!(grid.merge(&Grid3::new(2, 3, 3)).is_err());
    }

    #[test]
    fn test_tables_fold() {
        let mut tables = RunTables::new(Model::Single, 2, 2);
        let sample = vec![
            stats(Model::Single, 1, 0.5, 1.0),
            stats(Model::Single, 0, 2.0, 2.0),
        ];
        tables.fold(1, &sample).unwrap();
        tables.fold(1, &sample).unwrap();

        assert_eq!(tables.counts.get(0, 0, 1), 2.0);
        assert_eq!(tables.occupancy.get(0, 1, 1), 4.0);
        assert_eq!(tables.proportions.get(0, 0, 1), 1.0);
        assert_eq!(tables.proportions.get(0, 1, 1), 2.0);
        // assigned, not summed
        assert_eq!(tables.branch_lengths[1], vec![0.0, 2.0]);

        assert!(tables.fold(2, &sample).is_err());
        assert!(tables.fold(0, &sample[..1]).is_err());
    }

    #[test]
    fn test_tables_merge() {
        let mut a = RunTables::new(Model::Triplet, 1, 1);
        a.fold(0, &[stats(Model::Triplet, 1, 1.0, 1.0)]).unwrap();
        a.sites = 1;
        let mut b = RunTables::new(Model::Triplet, 1, 1);
        b.fold(0, &[stats(Model::Triplet, 2, 1.5, 3.0)]).unwrap();
        b.sites = 1;

        let empty = RunTables::new(Model::Triplet, 1, 1);
        let merged = empty.merge(a).unwrap().merge(b).unwrap();
        assert_eq!(merged.sites, 2);
        assert_eq!(merged.counts.get(0, 0, 0), 3.0);
        assert_eq!(merged.group_counts.get(0, 0, 0), 3.0);
        assert_eq!(merged.occupancy.get(0, 0, 0), 2.5);
        assert_eq!(merged.proportions.get(0, 0, 0), 1.5);
        assert_eq!(merged.branch_lengths, vec![vec![3.0]]);

        let single = RunTables::new(Model::Single, 1, 1);
        assert!(merged.merge(single).is_err());
    }
}
