//! Text blocks of the rate reports.

use super::estimate::{Estimates, Variant};
use super::table::{Grid3, RunTables};
use crate::libs::phylo::{PhyloError, Tree};
use itertools::Itertools;
use nalgebra::DMatrix;

/// Newick with each branch annotated by its rate, `rates` indexed by node number.
pub fn rate_newick(tree: &Tree, rates: &[f64]) -> String {
    tree.to_newick_with(|node| {
        node.parent
            .and_then(|_| rates.get(node.num).copied())
    })
}

/// `name  num` for every leaf, in number order
pub fn tip_listing(tree: &Tree) -> String {
    let mut out = String::from("list of names and tip numbers follows:\n");
    for num in 0..tree.n_leaves() {
        if let Some(node) = tree.get_node_by_num(num).and_then(|id| tree.get_node(id)) {
            out.push_str(&format!("{}  {}\n", node.name.as_deref().unwrap_or(""), num));
        }
    }
    out
}

/// Children numbers followed by the parent number, for every internal node in number order
pub fn adjacency_listing(tree: &Tree) -> String {
    let mut out = String::from("list of child1, child2, ..., parent follows:\n");
    for num in tree.n_leaves()..tree.len() {
        if let Some(node) = tree.get_node_by_num(num).and_then(|id| tree.get_node(id)) {
            let children = node
                .children
                .iter()
                .filter_map(|&c| tree.get_node(c))
                .map(|c| c.num)
                .join(" ");
            out.push_str(&format!("{} {}\n", children, num));
        }
    }
    out
}

/// One row per line, each value followed by a space
pub fn matrix_listing(m: &DMatrix<f64>) -> String {
    let mut out = String::from("variance-covariance matrix follows:\n");
    for row in m.row_iter() {
        for v in row.iter() {
            out.push_str(&format!("{} ", v));
        }
        out.push('\n');
    }
    out
}

/// Full report of type (or group) `k`: rate tree, tips, adjacency and covariance
pub fn estb_report(
    tree: &Tree,
    est: &Estimates,
    k: usize,
    variant: Variant,
) -> Result<String, PhyloError> {
    let mut out = rate_newick(tree, est.rates(k, variant)?);
    out.push('\n');
    out.push_str(&tip_listing(tree));
    out.push_str(&adjacency_listing(tree));
    out.push_str(&matrix_listing(&est.covariance(k, variant)?));
    Ok(out)
}

/// Report file name of type (or group) `k`
pub fn estb_filename(k: usize, variant: Variant) -> String {
    match variant {
        Variant::Type => format!("o.estb.type{}", k),
        Variant::Group => format!("o.estb.group{}", k),
    }
}

/// Mean group rates, one block per group with one branch per line
pub fn substitution_length(est: &Estimates) -> String {
    let mut out = String::new();
    for (g, bars) in est.theta_ss_bar.iter().enumerate() {
        out.push_str(&format!("Substitution length type {}\n", g));
        for v in bars {
            out.push_str(&format!("{}\n", v));
        }
    }
    out
}

/// Totals over iterations of every branch: changes per type and group, time
/// proportion per state, and summed rates per type and group
pub fn branch_summary(tables: &RunTables, est: &Estimates) -> String {
    fn block(out: &mut String, grid: &Grid3, label: &str, what: &str) {
        let (n_kinds, n_branches, _) = grid.shape();
        for k in 0..n_kinds {
            for l in 0..n_branches {
                let total: f64 = grid.row(k, l).iter().sum();
                out.push_str(&format!("{} {} {} on branch {}: {}\n", label, k, what, l, total));
            }
        }
    }

    let mut out = String::new();
    block(&mut out, &tables.counts, "Type", "changes");
    block(&mut out, &tables.group_counts, "Group", "changes");
    block(&mut out, &tables.proportions, "State", "proportion");
    block(&mut out, &est.theta, "Type", "rate sum");
    block(&mut out, &est.theta_ss, "Group", "rate sum");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::subst::Model;

    const LINE: &str = "((A_A:0.1:C:0.5:C,B_C:0.6:C)_C:0.2:G,D_G:1:G)_G;";

    #[test]
    fn test_rate_newick() {
        let tree = Tree::from_mapping(LINE).unwrap();
        let s = rate_newick(&tree, &[0.5, 0.25, 2.0, 1.0]);
        assert_eq!(s, "((A:0.5,B:0.25):1,D:2);");
    }

    #[test]
    fn test_listings() {
        let tree = Tree::from_mapping(LINE).unwrap();
        assert_eq!(
            tip_listing(&tree),
            "list of names and tip numbers follows:\nA  0\nB  1\nD  2\n"
        );
        assert_eq!(
            adjacency_listing(&tree),
            "list of child1, child2, ..., parent follows:\n0 1 3\n3 2 4\n"
        );

        let m = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 2.0]);
        assert_eq!(
            matrix_listing(&m),
            "variance-covariance matrix follows:\n1 0.5 \n0.5 2 \n"
        );
    }

    #[test]
    fn test_estb_report() {
        let tree = Tree::from_mapping(LINE).unwrap();
        let mut tables = RunTables::new(Model::Single, tree.n_branches(), 1);
        tables.counts.set(4, 3, 0, 1.0); // G->C on the internal branch
        tables.proportions.set(1, 3, 0, 0.5);
        let est = Estimates::from_tables(&tables);

        let report = estb_report(&tree, &est, 4, Variant::Type).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "((A:0,B:0):2,D:0);");
        assert_eq!(lines[1], "list of names and tip numbers follows:");
        assert_eq!(lines[8], "variance-covariance matrix follows:");
        assert_eq!(lines[12], "0 0 0 4 ");

        assert_eq!(estb_filename(4, Variant::Type), "o.estb.type4");
        assert_eq!(estb_filename(8, Variant::Group), "o.estb.group8");

        let lengths = substitution_length(&est);
        assert!(lengths.starts_with("Substitution length type 0\n0\n0\n"));
        assert_eq!(lengths.lines().count(), 6 * 5);
    }

    #[test]
    fn test_branch_summary() {
        let tree = Tree::from_mapping(LINE).unwrap();
        let mut tables = RunTables::new(Model::Single, tree.n_branches(), 2);
        tables.counts.set(4, 3, 0, 1.0);
        tables.counts.set(4, 3, 1, 2.0);
        tables.group_counts.set(0, 3, 1, 2.0);
        tables.proportions.set(1, 3, 0, 0.5);
        tables.proportions.set(1, 3, 1, 0.5);
        let est = Estimates::from_tables(&tables);

        let summary = branch_summary(&tables, &est);
        // 12 types, 6 groups and 4 states, over 4 branches
        assert_eq!(summary.lines().count(), (12 + 6 + 4 + 12 + 6) * 4);
        assert!(summary.starts_with("Type 0 changes on branch 0: 0\n"));
        assert!(summary.contains("\nType 4 changes on branch 3: 3\n"));
        assert!(summary.contains("\nGroup 0 changes on branch 3: 2\n"));
        assert!(summary.contains("\nState 1 proportion on branch 3: 1\n"));
        // 1 / 0.5 + 2 / 0.5
        assert!(summary.contains("\nType 4 rate sum on branch 3: 6\n"));
        assert!(summary.ends_with("Group 5 rate sum on branch 3: 0\n"));
    }
}
