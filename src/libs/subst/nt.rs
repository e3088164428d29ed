//! Nucleotide codes and the substitution tables of both models.

/// States in table order: A=0, G=1, C=2, T=3
pub const NUCLEOTIDES: [char; 4] = ['A', 'G', 'C', 'T'];

/// The 12 directed single-nucleotide substitutions, as (from, to) state indices.
/// Type `t` starts from state `t / 3`.
pub const SUBSTITUTIONS: [(usize, usize); 12] = [
    (0, 1), // A->G
    (0, 2), // A->C
    (0, 3), // A->T
    (1, 0), // G->A
    (1, 2), // G->C
    (1, 3), // G->T
    (2, 0), // C->A
    (2, 1), // C->G
    (2, 3), // C->T
    (3, 0), // T->A
    (3, 1), // T->G
    (3, 2), // T->C
];

/// A set of substitution types sharing one rate, with the states whose
/// occupancy measures their exposure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Group {
    pub name: &'static str,
    pub types: &'static [usize],
    pub exposure: &'static [usize],
}

const GC: &[usize] = &[1, 2];
const AT: &[usize] = &[0, 3];

/// Strand-symmetric pairs of the single-site model
pub const SINGLE_GROUPS: [Group; 6] = [
    Group { name: "G->C,C->G", types: &[4, 7], exposure: GC },
    Group { name: "G->T,C->A", types: &[5, 6], exposure: GC },
    Group { name: "A->T,T->A", types: &[2, 9], exposure: AT },
    Group { name: "A->C,T->G", types: &[1, 10], exposure: AT },
    Group { name: "G->A,C->T", types: &[3, 8], exposure: GC },
    Group { name: "A->G,T->C", types: &[0, 11], exposure: AT },
];

/// Middle-site contexts of the triplet model
pub const CONTEXTS: [&str; 3] = ["C+G", "A+T", "CpG"];

/// Coarse triplet categories, exposed to non-CpG (C+G and A+T) or CpG time
pub const TRIPLET_TYPES: [Group; 4] = [
    Group { name: "non-CpG transversion", types: &[0], exposure: &[0, 1] },
    Group { name: "non-CpG transition", types: &[1], exposure: &[0, 1] },
    Group { name: "CpG transversion", types: &[2], exposure: &[2] },
    Group { name: "CpG transition", types: &[3], exposure: &[2] },
];

/// Fine triplet groups: strand-symmetric pairs split by context
pub const TRIPLET_GROUPS: [Group; 9] = [
    Group { name: "G->C,C->G", types: &[], exposure: &[0] },
    Group { name: "G->T,C->A", types: &[], exposure: &[0] },
    Group { name: "T->A,A->T", types: &[], exposure: &[1] },
    Group { name: "T->G,A->C", types: &[], exposure: &[1] },
    Group { name: "G->A,C->T", types: &[], exposure: &[0] },
    Group { name: "A->G,T->C", types: &[], exposure: &[1] },
    Group { name: "CpG G->C,C->G", types: &[], exposure: &[2] },
    Group { name: "CpG G->T,C->A", types: &[], exposure: &[2] },
    Group { name: "CpG G->A,C->T", types: &[], exposure: &[2] },
];

/// Index of a nucleotide in `NUCLEOTIDES`
pub fn nt_index(c: char) -> Option<usize> {
    match c.to_ascii_uppercase() {
        'A' => Some(0),
        'G' => Some(1),
        'C' => Some(2),
        'T' => Some(3),
        _ => None,
    }
}

/// Type index of the substitution `from -> to`; `None` when the states are equal
pub fn substitution_index(from: usize, to: usize) -> Option<usize> {
    if from == to || from > 3 || to > 3 {
        return None;
    }
    Some(from * 3 + if to > from { to - 1 } else { to })
}

/// Purine <-> purine or pyrimidine <-> pyrimidine
pub fn is_transition(from: usize, to: usize) -> bool {
    from != to && (from < 2) == (to < 2)
}

/// Strand-symmetric pair of a substitution, 0..6 in `SINGLE_GROUPS` order
pub fn single_group(from: usize, to: usize) -> Option<usize> {
    let t = substitution_index(from, to)?;
    SINGLE_GROUPS.iter().position(|g| g.types.contains(&t))
}

/// Group of a middle-site substitution in `TRIPLET_GROUPS` order.
/// CpG substitutions always start from C or G.
pub fn triplet_group(from: usize, to: usize, cpg: bool) -> Option<usize> {
    let g = single_group(from, to)?;
    if !cpg {
        return Some(g);
    }
    match g {
        0 => Some(6),
        1 => Some(7),
        4 => Some(8),
        _ => None,
    }
}
