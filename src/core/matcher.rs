//! Match predicates for entities and relations.
//!
//! Two policies are supported:
//! - **Exact**: spans must be identical
//! - **Overlap**: spans must intersect
//!
//! Entity matching ignores labels. Relation matching requires equal label
//! sets and equal directedness.

use crate::domain::{Entity, Relation};

/// Whether two entities match under the chosen policy
pub fn entities_match(a: &Entity, b: &Entity, overlap: bool) -> bool {
    if a.file_id != b.file_id {
        return false;
    }
    if overlap {
        a.span.overlaps(&b.span)
    } else {
        a.span == b.span
    }
}

/// Whether two relations match under the chosen policy.
///
/// Directed relations compare arguments position by position. Undirected
/// relations match when some pairing of the two argument lists has every
/// pair matching.
pub fn relations_match(r1: &Relation, r2: &Relation, overlap: bool) -> bool {
    if r1.file_id != r2.file_id || r1.directed != r2.directed || r1.label != r2.label {
        return false;
    }
    if r1.directed {
        entities_match(&r1.arg1, &r2.arg1, overlap) && entities_match(&r1.arg2, &r2.arg2, overlap)
    } else {
        perfect_matching_exists(&[&r1.arg1, &r1.arg2], &[&r2.arg1, &r2.arg2], |a, b| {
            entities_match(a, b, overlap)
        })
    }
}

/// Bipartite perfect matching existence test.
///
/// Returns true when every element of `left` can be paired with a distinct
/// element of `right` such that `compatible` holds for every pair. Uses
/// augmenting paths; argument lists here are tiny.
pub fn perfect_matching_exists<L, R, F>(left: &[L], right: &[R], compatible: F) -> bool
where
    F: Fn(&L, &R) -> bool,
{
    if left.len() != right.len() {
        return false;
    }

    let adjacency: Vec<Vec<usize>> = left
        .iter()
        .map(|l| {
            right
                .iter()
                .enumerate()
                .filter(|(_, r)| compatible(l, r))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    // right index -> left index currently paired with it
    let mut owner: Vec<Option<usize>> = vec![None; right.len()];

    for i in 0..left.len() {
        let mut visited = vec![false; right.len()];
        if !augment(i, &adjacency, &mut owner, &mut visited) {
            return false;
        }
    }
    true
}

fn augment(
    i: usize,
    adjacency: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &j in &adjacency[i] {
        if visited[j] {
            continue;
        }
        visited[j] = true;
        let free = match owner[j] {
            None => true,
            Some(k) => augment(k, adjacency, owner, visited),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Span;

    fn entity(start: usize, end: usize) -> Entity {
        Entity::new(1, Span::new(start, end).unwrap(), format!("e{}-{}", start, end))
    }

    fn relation(a: (usize, usize), b: (usize, usize), label: &str, directed: bool) -> Relation {
        Relation::new(1, entity(a.0, a.1), entity(b.0, b.1), [label], directed)
    }

    #[test]
    fn test_entities_exact_vs_overlap() {
        let a = entity(10, 20);
        let b = entity(15, 25);
        assert!(entities_match(&a, &b, true));
        assert!(!entities_match(&a, &b, false));
        assert!(entities_match(&a, &a.clone(), false));
    }

    #[test]
    fn test_entities_different_files_never_match() {
        let a = entity(0, 5);
        let mut b = entity(0, 5);
        b.file_id = 2;
        assert!(!entities_match(&a, &b, false));
        assert!(!entities_match(&a, &b, true));
    }

    #[test]
    fn test_undirected_overlap_uses_swapped_pairing() {
        let r1 = relation((0, 5), (10, 15), "causes", false);
        let r2 = relation((12, 14), (1, 4), "causes", false);
        assert!(relations_match(&r1, &r2, true));
        assert!(!relations_match(&r1, &r2, false));
    }

    #[test]
    fn test_undirected_exact_ignores_order() {
        let r1 = relation((0, 5), (10, 15), "causes", false);
        let r2 = relation((10, 15), (0, 5), "causes", false);
        assert!(relations_match(&r1, &r2, false));
    }

    #[test]
    fn test_directed_is_order_sensitive() {
        let r1 = relation((0, 5), (10, 15), "causes", true);
        let r2 = relation((10, 15), (0, 5), "causes", true);
        assert!(!relations_match(&r1, &r2, false));
        assert!(!relations_match(&r1, &r2, true));
        assert!(relations_match(&r1, &r1.clone(), false));
    }

    #[test]
    fn test_directedness_and_labels_must_agree() {
        let directed = relation((0, 5), (10, 15), "causes", true);
        let undirected = relation((0, 5), (10, 15), "causes", false);
        let other_label = relation((0, 5), (10, 15), "treats", false);
        assert!(!relations_match(&directed, &undirected, false));
        assert!(!relations_match(&undirected, &other_label, true));
    }

    #[test]
    fn test_label_set_is_order_independent() {
        let mut r1 = relation((0, 5), (10, 15), "causes", false);
        let mut r2 = r1.clone();
        r1.label = ["a", "b"].iter().map(|s| s.to_string()).collect();
        r2.label = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert!(relations_match(&r1, &r2, false));
    }

    #[test]
    fn test_perfect_matching_needs_distinct_partners() {
        // Both left items only fit right[0]
        let left = [1, 1];
        let right = [1, 2];
        assert!(!perfect_matching_exists(&left, &right, |a, b| a == b));

        let left = [1, 2, 3];
        let right = [3, 1, 2];
        assert!(perfect_matching_exists(&left, &right, |a, b| a == b));

        assert!(!perfect_matching_exists(&[1], &[1, 2], |a: &i32, b: &i32| a == b));
    }

    #[test]
    fn test_perfect_matching_requires_augmenting_path() {
        // Greedy would pair left[0] with right[0] and strand left[1]
        let compat = |l: &usize, r: &usize| matches!((*l, *r), (0, 0) | (0, 1) | (1, 0));
        assert!(perfect_matching_exists(&[0usize, 1], &[0usize, 1], compat));
    }
}
