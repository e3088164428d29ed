use super::nt;
use super::{BranchStats, Model};
use crate::libs::phylo::{PhyloError, Segment, Tree};
use itertools::Itertools;

/// Merged history of three consecutive sites along one branch.
///
/// `states[k]` holds during `durations[k]`; the last state is the node's own
/// triplet and carries no duration.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPath {
    pub states: Vec<[char; 3]>,
    pub durations: Vec<f64>,
    /// Branch length of the middle site
    pub length: f64,
}

impl JointPath {
    /// States as strings, e.g. `TGG`
    pub fn state_strings(&self) -> Vec<String> {
        self.states.iter().map(|s| s.iter().collect()).collect()
    }
}

/// A joint state is CpG when a C is directly followed by a G
pub fn is_cpg(state: &[char; 3]) -> bool {
    (state[0] == 'C' && state[1] == 'G') || (state[1] == 'C' && state[2] == 'G')
}

/// Merge three event paths of one branch into a joint path.
///
/// Every event is a change of one site at its cumulative time; the branch's final
/// state change is not an event. Events are ordered by time and then by site, and
/// each updates one position, so simultaneous events leave zero-length intervals.
/// The last interval runs up to `length`, the middle site's branch length.
pub fn merge_branch(
    paths: [&[Segment]; 3],
    terminals: [char; 3],
    length: f64,
) -> Result<JointPath, PhyloError> {
    let mut current = ['-'; 3];
    let mut events: Vec<(f64, usize, char)> = Vec::new();

    for (site, path) in paths.iter().enumerate() {
        let first = path
            .first()
            .ok_or_else(|| PhyloError::LogicError(format!("Empty event path at site {}", site)))?;
        current[site] = first.state;

        let mut time = 0.0;
        for (seg, next) in path.iter().tuple_windows() {
            time += seg.duration;
            events.push((time, site, next.state));
        }
    }

    // stable: events of one site at one time keep their order
    events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut states = Vec::with_capacity(events.len() + 2);
    let mut durations = Vec::with_capacity(events.len() + 1);
    states.push(current);

    let mut last = 0.0;
    for (time, site, state) in events {
        durations.push(time - last);
        last = time;
        current[site] = state;
        states.push(current);
    }
    durations.push(length - last);
    states.push(terminals);

    Ok(JointPath {
        states,
        durations,
        length,
    })
}

fn state_index(c: char) -> Result<usize, PhyloError> {
    nt::nt_index(c).ok_or_else(|| PhyloError::LogicError(format!("Unknown nucleotide state {}", c)))
}

/// Count middle-site changes and context occupancy of a joint path.
///
/// A change takes its context from the joint state it leaves. The A+T time is
/// what remains of the branch after C+G and CpG, so the three contexts always sum
/// to the branch length.
pub fn classify(joint: &JointPath) -> Result<BranchStats, PhyloError> {
    let mut stats = BranchStats::new(Model::Triplet);
    stats.length = joint.length;

    for (state, next) in joint.states.iter().tuple_windows() {
        let (from, to) = (state_index(state[1])?, state_index(next[1])?);
        if from == to {
            continue;
        }
        let cpg = is_cpg(state);
        let t = match (cpg, nt::is_transition(from, to)) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => 3,
        };
        let g = nt::triplet_group(from, to, cpg).ok_or_else(|| {
            PhyloError::LogicError(format!(
                "No group for {}->{} in {}",
                state[1],
                next[1],
                state.iter().collect::<String>()
            ))
        })?;
        stats.counts[t] += 1;
        stats.group_counts[g] += 1;
    }

    let (mut cg, mut cpg) = (0.0_f64, 0.0_f64);
    for (state, &duration) in joint.states.iter().zip(&joint.durations) {
        if is_cpg(state) {
            cpg += duration;
        } else if matches!(state[1], 'C' | 'G') {
            cg += duration;
        }
    }
    stats.occupancy = vec![cg, joint.length - cg - cpg, cpg];

    Ok(stats)
}

/// Joint paths of every branch, indexed by node number.
///
/// The three trees must share topology and numbering.
pub fn joint_paths(trees: [&Tree; 3]) -> Result<Vec<JointPath>, PhyloError> {
    trees[1].check_same_topology(trees[0])?;
    trees[1].check_same_topology(trees[2])?;

    let mut result = Vec::with_capacity(trees[1].n_branches());
    for num in 0..trees[1].n_branches() {
        let mut paths: [Vec<Segment>; 3] = Default::default();
        let mut terminals = ['-'; 3];
        let mut length = 0.0;

        for (site, tree) in trees.iter().enumerate() {
            let id = tree.get_node_by_num(num).ok_or_else(|| {
                PhyloError::LogicError(format!("No node numbered {} at site {}", num, site))
            })?;
            let node = tree
                .get_node(id)
                .ok_or_else(|| PhyloError::LogicError(format!("Node {} not found", id)))?;
            paths[site] = tree.event_path(id)?;
            terminals[site] = node.state.ok_or_else(|| {
                PhyloError::LogicError(format!("Node {} has no state at site {}", num, site))
            })?;
            if site == 1 {
                length = node.length();
            }
        }

        result.push(merge_branch(
            [&paths[0], &paths[1], &paths[2]],
            terminals,
            length,
        )?);
    }
    Ok(result)
}

/// Summaries of every branch of a three-site window, indexed by node number.
pub fn summarize(trees: [&Tree; 3]) -> Result<Vec<BranchStats>, PhyloError> {
    joint_paths(trees)?.iter().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::fixtures::{GTR_322, GTR_323, GTR_324};
    use approx::assert_relative_eq;

    fn window() -> [Tree; 3] {
        [
            Tree::from_mapping(GTR_322).unwrap(),
            Tree::from_mapping(GTR_323).unwrap(),
            Tree::from_mapping(GTR_324).unwrap(),
        ]
    }

    #[test]
    fn test_triplet_marmoset_path() {
        let [t0, t1, t2] = window();
        let paths = joint_paths([&t0, &t1, &t2]).unwrap();
        assert_eq!(paths.len(), 9);

        let marmoset = &paths[4];
        assert_eq!(
            marmoset.state_strings(),
            vec!["TGG", "TTG", "TTC", "TCC", "TCT", "ACT", "GCT", "ACT", "CCT", "CCT"]
        );

        let expected = [
            0.947449, 0.294941, 0.0002, 0.629991, 0.340449, 0.685267, 0.0718244, 1.71246,
            0.0890486,
        ];
        assert_eq!(marmoset.durations.len(), expected.len());
        for (d, e) in marmoset.durations.iter().zip(expected) {
            assert_relative_eq!(*d, e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_triplet_branch_lengths() {
        let [t0, t1, t2] = window();
        let paths = joint_paths([&t0, &t1, &t2]).unwrap();
        let expected = [
            0.101652, 0.175401, 0.320445, 0.416258, 4.77163, 8.18555, 0.27683, 0.649724, 5.24651,
        ];
        for (p, e) in paths.iter().zip(expected) {
            assert_relative_eq!(p.length, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_triplet_counts() {
        let [t0, t1, t2] = window();
        let stats = summarize([&t0, &t1, &t2]).unwrap();

        for (l, s) in stats.iter().enumerate() {
            if l == 4 {
                assert_eq!(s.counts, vec![1, 1, 0, 0]);
                // G->T and T->C, both outside CpG
                assert_eq!(s.group_counts, vec![0, 1, 0, 0, 0, 1, 0, 0, 0]);
            } else {
                assert_eq!(s.counts, vec![0; 4], "branch {}", l);
            }
        }
    }

    #[test]
    fn test_triplet_contexts() {
        let [t0, t1, t2] = window();
        let stats = summarize([&t0, &t1, &t2]).unwrap();

        assert_relative_eq!(stats[4].occupancy[0], 4.476489, epsilon = 1e-6);
        assert_relative_eq!(stats[4].occupancy[1], 0.295141, epsilon = 1e-6);
        assert_relative_eq!(stats[4].occupancy[2], 0.0, epsilon = 1e-9);

        assert_relative_eq!(stats[5].occupancy[0], 7.051235, epsilon = 1e-6);
        assert_relative_eq!(stats[5].occupancy[2], 1.134315, epsilon = 1e-6);
        assert_relative_eq!(stats[8].occupancy[0], 4.563469, epsilon = 1e-6);
        assert_relative_eq!(stats[8].occupancy[2], 0.683041, epsilon = 1e-6);

        assert_relative_eq!(stats[0].occupancy[0], 0.101652, epsilon = 1e-9);

        for s in &stats {
            assert_relative_eq!(s.occupancy.iter().sum::<f64>(), s.length, epsilon = 1e-12);
        }

        let props = stats[5].proportions();
        assert_relative_eq!(props[2], 1.134315 / 8.18555, epsilon = 1e-6);
    }

    #[test]
    fn test_triplet_ties_break_by_site() {
        let a = [
            Segment { state: 'A', duration: 0.5 },
            Segment { state: 'C', duration: 0.5 },
        ];
        let b = [
            Segment { state: 'C', duration: 0.5 },
            Segment { state: 'G', duration: 0.5 },
        ];
        let joint = merge_branch([&b, &a, &b], ['G', 'C', 'G'], 1.0).unwrap();

        // site 0 first, then site 1, then site 2; two zero-length intervals
        assert_eq!(
            joint.state_strings(),
            vec!["CAC", "GAC", "GCC", "GCG", "GCG"]
        );
        assert_eq!(joint.durations, vec![0.5, 0.0, 0.0, 0.5]);

        // A->C leaves GAC: non-CpG transversion
        let stats = classify(&joint).unwrap();
        assert_eq!(stats.counts, vec![1, 0, 0, 0]);
        assert_eq!(stats.group_counts[3], 1);
        // GCG is CpG for the last half
        assert_eq!(stats.occupancy, vec![0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_triplet_cpg_context() {
        assert!(is_cpg(&['A', 'C', 'G']));
        assert!(is_cpg(&['C', 'G', 'T']));
        assert!(!is_cpg(&['G', 'C', 'A']));

        // C->T with a following G
        let joint = JointPath {
            states: vec![['A', 'C', 'G'], ['A', 'T', 'G']],
            durations: vec![1.0],
            length: 1.0,
        };
        let stats = classify(&joint).unwrap();
        assert_eq!(stats.counts, vec![0, 0, 0, 1]);
        assert_eq!(stats.group_counts[8], 1);
        assert_eq!(stats.occupancy, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_triplet_topology_mismatch() {
        let t0 = Tree::from_mapping(GTR_322).unwrap();
        let t1 = Tree::from_mapping(GTR_323).unwrap();
        let t2 = Tree::from_mapping(&GTR_324.replace("rhesus", "macaque")).unwrap();
        assert!(matches!(
            joint_paths([&t0, &t1, &t2]),
            Err(PhyloError::TopologyMismatch(_))
        ));
    }
}
