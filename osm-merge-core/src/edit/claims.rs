//! Which pair replaces a candidate, and which candidate nodes must survive.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use super::MatchPair;
use crate::{ElementId, Way};

/// Map each accepted candidate id to the first pair that accepted it.
pub(super) fn claim_candidates(pairs: &[MatchPair]) -> HashMap<ElementId, usize> {
    let mut claims = HashMap::new();
    for (index, pair) in pairs.iter().enumerate() {
        if let Some(candidate) = pair.accepted_candidate() {
            claims.entry(candidate.id).or_insert(index);
        }
    }
    claims
}

/// Nodes used by `context_ways` other than those in `replaced`.
pub(super) fn protected_nodes<I>(context_ways: &[Arc<Way>], replaced: I) -> HashSet<ElementId>
where
    I: IntoIterator<Item = ElementId>,
{
    let replaced: HashSet<ElementId> = replaced.into_iter().collect();
    context_ways
        .iter()
        .filter(|way| !replaced.contains(&way.id))
        .flat_map(|way| way.nodes().iter().map(|node| node.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, Similarity, Verdict};
    use rstest::rstest;

    fn way(id: ElementId, node_ids: &[ElementId]) -> Arc<Way> {
        let nodes = node_ids
            .iter()
            .map(|&node_id| Arc::new(Node::new(node_id, 0.0, 0.0)))
            .collect();
        Arc::new(Way::new(id, nodes).expect("way"))
    }

    fn verdict(source: &Arc<Way>, candidate: &Arc<Way>, verdict: Verdict) -> MatchPair {
        MatchPair::classified(
            Arc::clone(source),
            Arc::clone(candidate),
            Similarity {
                jaccard: 0.5,
                verdict,
            },
        )
    }

    #[rstest]
    fn first_accepting_pair_claims_the_candidate() {
        let candidate = way(20, &[1, 2]);
        let pairs = [
            verdict(&way(1, &[3]), &candidate, Verdict::Reject),
            verdict(&way(2, &[4]), &candidate, Verdict::Accept),
            verdict(&way(3, &[5]), &candidate, Verdict::Accept),
        ];
        let claims = claim_candidates(&pairs);
        assert_eq!(claims.get(&20), Some(&1));
        assert_eq!(claims.len(), 1);
    }

    #[rstest]
    fn replaced_ways_protect_nothing() {
        let context = [way(20, &[1, 2]), way(21, &[2, 3])];
        let protected = protected_nodes(&context, [20]);
        let mut ids: Vec<_> = protected.into_iter().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3]);
    }
}
