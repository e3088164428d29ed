//! Per-branch summaries of stochastic mappings.

pub mod nt;
pub mod single;
pub mod triplet;

use nt::Group;

/// Which substitution model a run follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// 12 directed types over 4 nucleotide states
    Single,
    /// CpG context of the middle site of three consecutive sites
    Triplet,
}

const SINGLE_TYPE_EXPOSURE: [&[usize]; 4] = [&[0], &[1], &[2], &[3]];

impl Model {
    pub fn n_types(&self) -> usize {
        match self {
            Model::Single => nt::SUBSTITUTIONS.len(),
            Model::Triplet => nt::TRIPLET_TYPES.len(),
        }
    }

    pub fn n_groups(&self) -> usize {
        self.groups().len()
    }

    /// Occupancy categories: nucleotides, or middle-site contexts
    pub fn n_states(&self) -> usize {
        match self {
            Model::Single => nt::NUCLEOTIDES.len(),
            Model::Triplet => nt::CONTEXTS.len(),
        }
    }

    pub fn groups(&self) -> &'static [Group] {
        match self {
            Model::Single => &nt::SINGLE_GROUPS,
            Model::Triplet => &nt::TRIPLET_GROUPS,
        }
    }

    /// States whose occupancy is the exposure of type `t`
    pub fn type_exposure(&self, t: usize) -> &'static [usize] {
        match self {
            Model::Single => SINGLE_TYPE_EXPOSURE[nt::SUBSTITUTIONS[t].0],
            Model::Triplet => nt::TRIPLET_TYPES[t].exposure,
        }
    }

    /// States whose occupancy is the exposure of group `g`
    pub fn group_exposure(&self, g: usize) -> &'static [usize] {
        self.groups()[g].exposure
    }
}

/// Counts and occupancy of one branch in one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStats {
    /// Changes per substitution type
    pub counts: Vec<usize>,
    /// Changes per group
    pub group_counts: Vec<usize>,
    /// Time spent in each state (or context)
    pub occupancy: Vec<f64>,
    pub length: f64,
}

impl BranchStats {
    pub fn new(model: Model) -> Self {
        Self {
            counts: vec![0; model.n_types()],
            group_counts: vec![0; model.n_groups()],
            occupancy: vec![0.0; model.n_states()],
            length: 0.0,
        }
    }

    /// Occupancy over branch length; all zero on a zero-length branch
    pub fn proportions(&self) -> Vec<f64> {
        self.occupancy
            .iter()
            .map(|&t| if self.length > 0.0 { t / self.length } else { 0.0 })
            .collect()
    }
}
