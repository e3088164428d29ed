use super::nt;
use super::{BranchStats, Model};
use crate::libs::phylo::{PhyloError, Segment, Tree};

fn state_index(c: char) -> Result<usize, PhyloError> {
    nt::nt_index(c).ok_or_else(|| PhyloError::LogicError(format!("Unknown nucleotide state {}", c)))
}

/// Counts and occupancy of one branch from its chronological event path.
///
/// Changes are read over consecutive states of the path, with `terminal` appended.
/// Occupancy sums segment durations; the terminal state is entered at the node and
/// owns no time of its own.
pub fn summarize_branch(path: &[Segment], terminal: char) -> Result<BranchStats, PhyloError> {
    let mut stats = BranchStats::new(Model::Single);

    let mut states = Vec::with_capacity(path.len() + 1);
    for seg in path {
        let s = state_index(seg.state)?;
        stats.occupancy[s] += seg.duration;
        stats.length += seg.duration;
        states.push(s);
    }
    states.push(state_index(terminal)?);

    for pair in states.windows(2) {
        if let Some(t) = nt::substitution_index(pair[0], pair[1]) {
            stats.counts[t] += 1;
        }
    }

    for (g, group) in nt::SINGLE_GROUPS.iter().enumerate() {
        stats.group_counts[g] = group.types.iter().map(|&t| stats.counts[t]).sum();
    }

    Ok(stats)
}

/// Summaries of every branch, indexed by node number.
pub fn summarize(tree: &Tree) -> Result<Vec<BranchStats>, PhyloError> {
    let mut result = Vec::with_capacity(tree.n_branches());
    for (id, _) in tree.branches() {
        let node = tree
            .get_node(id)
            .ok_or_else(|| PhyloError::LogicError(format!("Node {} not found", id)))?;
        let terminal = node.state.ok_or_else(|| {
            PhyloError::LogicError(format!("Node {} has no state", node.num))
        })?;
        result.push(summarize_branch(&tree.event_path(id)?, terminal)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::fixtures::SINGLE_12;
    use approx::assert_relative_eq;

    fn seg(state: char, duration: f64) -> Segment {
        Segment { state, duration }
    }

    #[test]
    fn test_single_no_events() {
        // same state: no change, all time in it
        let stats = summarize_branch(&[seg('C', 0.4)], 'C').unwrap();
        assert_eq!(stats.counts.iter().sum::<usize>(), 0);
        assert_eq!(stats.occupancy, vec![0.0, 0.0, 0.4, 0.0]);

        // different state: exactly one change
        let stats = summarize_branch(&[seg('G', 0.8)], 'T').unwrap();
        assert_eq!(stats.counts[5], 1); // G->T
        assert_eq!(stats.counts.iter().sum::<usize>(), 1);
        assert_eq!(stats.occupancy[1], 0.8);
        assert_eq!(stats.group_counts[1], 1);
    }

    #[test]
    fn test_single_unknown_state() {
        assert!(summarize_branch(&[seg('N', 0.4)], 'C').is_err());
    }

    #[test]
    fn test_single_fixture_lengths() {
        let tree = Tree::from_mapping(SINGLE_12).unwrap();
        let stats = summarize(&tree).unwrap();
        assert_eq!(stats.len(), 12);

        let expected = [0.6, 0.7, 0.5, 0.5, 0.4, 0.7, 1.0, 0.7, 1.2, 1.3, 1.0, 0.8];
        for (s, e) in stats.iter().zip(expected) {
            assert_relative_eq!(s.length, e, epsilon = 1e-9);
            assert_relative_eq!(s.occupancy.iter().sum::<f64>(), e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_fixture_counts() {
        let tree = Tree::from_mapping(SINGLE_12).unwrap();
        let stats = summarize(&tree).unwrap();

        // (type, branches with one change)
        let changes: [(usize, &[usize]); 4] = [
            (6, &[0, 1, 6]), // C->A
            (4, &[8, 10]),   // G->C
            (5, &[9]),       // G->T
            (9, &[2]),       // T->A
        ];
        for l in 0..12 {
            for t in 0..12 {
                let expected = changes
                    .iter()
                    .any(|(ct, branches)| *ct == t && branches.contains(&l));
                assert_eq!(stats[l].counts[t], expected as usize, "branch {} type {}", l, t);
            }
        }

        // C->A and G->T share a group
        assert_eq!(stats[9].group_counts, vec![0, 1, 0, 0, 0, 0]);
        assert_eq!(stats[0].group_counts, vec![0, 1, 0, 0, 0, 0]);
        assert_eq!(stats[2].group_counts, vec![0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_single_fixture_occupancy() {
        let tree = Tree::from_mapping(SINGLE_12).unwrap();
        let stats = summarize(&tree).unwrap();

        // A G C T
        assert_relative_eq!(stats[2].occupancy[0], 0.3, epsilon = 1e-9);
        assert_relative_eq!(stats[2].occupancy[3], 0.2, epsilon = 1e-9);
        assert_relative_eq!(stats[9].occupancy[1], 0.5, epsilon = 1e-9);
        assert_relative_eq!(stats[9].occupancy[3], 0.8, epsilon = 1e-9);
        assert_relative_eq!(stats[6].occupancy[2], 1.0, epsilon = 1e-9);
        assert_relative_eq!(stats[11].occupancy[1], 0.8, epsilon = 1e-9);

        let props = stats[9].proportions();
        assert_relative_eq!(props[1], 0.5 / 1.3, epsilon = 1e-9);
        assert_relative_eq!(props[3], 0.8 / 1.3, epsilon = 1e-9);
    }
}
