use riftgraph_core::{GraphLink, NodeId};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};

/// Ordered node ids of a directed route. Never empty; a single element means
/// source and target were the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePath(Vec<NodeId>);

impl TracePath {
    pub fn new(ids: Vec<NodeId>) -> Option<Self> {
        if ids.is_empty() {
            None
        } else {
            Some(Self(ids))
        }
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }

    /// Consecutive (source, target) pairs, in path order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.0.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn node_set(&self) -> HashSet<NodeId> {
        self.0.iter().cloned().collect()
    }

    pub fn display_chain(&self) -> String {
        self.0
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

type Adjacency<'a> = HashMap<&'a str, SmallVec<[&'a str; 4]>>;

fn adjacency(links: &[GraphLink]) -> Adjacency<'_> {
    let mut adj: Adjacency<'_> = HashMap::new();
    for link in links {
        adj.entry(link.source.as_str())
            .or_default()
            .push(link.target.as_str());
    }
    adj
}

/// Breadth-first search over directed links. The first path reaching `target`
/// is the shortest by hop count; ties go to the earlier-inserted link.
pub fn trace(source: &str, target: &str, links: &[GraphLink]) -> Option<TracePath> {
    let adj = adjacency(links);

    let mut queue: VecDeque<Vec<&str>> = VecDeque::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    queue.push_back(vec![source]);

    while let Some(path) = queue.pop_front() {
        let Some(&last) = path.last() else {
            continue;
        };
        if last == target {
            return TracePath::new(path.into_iter().map(NodeId::from).collect());
        }
        if !expanded.insert(last) {
            continue;
        }
        let Some(next) = adj.get(last) else {
            continue;
        };
        for &n in next.iter() {
            let mut extended = path.clone();
            extended.push(n);
            queue.push_back(extended);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(source: &str, target: &str) -> GraphLink {
        GraphLink {
            source: NodeId::from(source),
            target: NodeId::from(target),
            amount: 1.0,
            timestamp: Default::default(),
            is_ring: false,
        }
    }

    fn ids(path: &TracePath) -> Vec<&str> {
        path.ids().iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn finds_chain() {
        let links = vec![link("A", "B"), link("B", "C")];
        let path = trace("A", "C", &links).expect("path");
        assert_eq!(ids(&path), vec!["A", "B", "C"]);
        assert_eq!(path.hops(), 2);
    }

    #[test]
    fn isolated_target_has_no_path() {
        let links = vec![link("A", "B"), link("B", "C")];
        assert!(trace("A", "D", &links).is_none());
    }

    #[test]
    fn shortest_path_wins_and_ties_follow_insertion_order() {
        let links = vec![
            link("A", "B"),
            link("A", "C"),
            link("B", "D"),
            link("C", "D"),
            link("A", "E"),
            link("E", "F"),
            link("F", "D"),
        ];
        let path = trace("A", "D", &links).expect("path");
        assert_eq!(ids(&path), vec!["A", "B", "D"]);
    }

    #[test]
    fn search_is_directed_only() {
        let links = vec![link("A", "B"), link("B", "C")];
        assert!(trace("C", "A", &links).is_none());
    }

    #[test]
    fn cycles_terminate() {
        let links = vec![link("A", "B"), link("B", "C"), link("C", "A")];
        assert!(trace("A", "Z", &links).is_none());
        let path = trace("B", "A", &links).expect("path");
        assert_eq!(ids(&path), vec!["B", "C", "A"]);
    }

    #[test]
    fn same_source_and_target_is_single_node_path() {
        let links = vec![link("A", "B")];
        let path = trace("A", "A", &links).expect("path");
        assert_eq!(ids(&path), vec!["A"]);
        assert_eq!(path.hops(), 0);
        assert_eq!(path.edges().count(), 0);
    }

    #[test]
    fn display_chain_joins_with_arrows() {
        let links = vec![link("A", "B"), link("B", "C")];
        let path = trace("A", "C", &links).expect("path");
        assert_eq!(path.display_chain(), "A → B → C");
    }
}
