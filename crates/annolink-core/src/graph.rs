//! Graph storage and manipulation

use crate::model::{Term, Triple};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

type Positions = SmallVec<[usize; 8]>;

/// In-memory RDF graph with indexing for fast pattern queries
///
/// Statements are deduplicated by triple identity; insertion order carries no
/// meaning and equality between graphs is set equality.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    /// Triple -> position in `triples`, used for deduplication
    positions: HashMap<Triple, usize>,
    /// Subject index: subject -> ascending positions in `triples`
    subject_index: HashMap<Term, Positions>,
    /// Predicate index: predicate -> ascending positions
    predicate_index: HashMap<Term, Positions>,
    /// Object index: object -> ascending positions
    object_index: HashMap<Term, Positions>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a triple, returning `false` when it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.positions.contains_key(&triple) {
            return false;
        }

        let index = self.triples.len();
        self.subject_index.entry(triple.subject.clone()).or_default().push(index);
        self.predicate_index.entry(triple.predicate.clone()).or_default().push(index);
        self.object_index.entry(triple.object.clone()).or_default().push(index);
        self.positions.insert(triple.clone(), index);
        self.triples.push(triple);
        true
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.positions.contains_key(triple)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// Find triples matching a pattern; `None` matches anything
    pub fn find_triples(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> Vec<&Triple> {
        let lookup = |index: &HashMap<Term, Positions>, key: &Term| -> Positions {
            index.get(key).cloned().unwrap_or_default()
        };

        // Narrow with every bound component, smallest intersection wins
        let mut candidates: Option<Positions> = None;
        for (index, key) in [
            (&self.subject_index, subject),
            (&self.predicate_index, predicate),
            (&self.object_index, object),
        ] {
            if let Some(key) = key {
                let positions = lookup(index, key);
                candidates = Some(match candidates {
                    Some(current) => intersect_indices(&current, &positions),
                    None => positions,
                });
            }
        }

        match candidates {
            Some(positions) => positions.iter().filter_map(|&i| self.triples.get(i)).collect(),
            None => self.triples.iter().collect(),
        }
    }

    /// Objects of every `(subject?, predicate, ?)` statement
    pub fn objects(&self, subject: Option<&Term>, predicate: &str) -> Vec<&Term> {
        let predicate = Term::iri(predicate);
        self.find_triples(subject, Some(&predicate), None)
            .into_iter()
            .map(|triple| &triple.object)
            .collect()
    }

    /// Subjects of every `(?, predicate, object)` statement
    pub fn subjects(&self, predicate: &str, object: &Term) -> Vec<&Term> {
        let predicate = Term::iri(predicate);
        self.find_triples(None, Some(&predicate), Some(object))
            .into_iter()
            .map(|triple| &triple.subject)
            .collect()
    }

    /// Whether `subject rdf:type class` is asserted
    pub fn has_type(&self, subject: &Term, class: &str) -> bool {
        let rdf_type = Term::iri(crate::vocab::rdf::TYPE);
        self.contains(&Triple::new(subject.clone(), rdf_type, Term::iri(class)))
    }

    /// In-place set union. Blank node labels are taken as-is, so both graphs
    /// must share one blank node scope.
    pub fn union(&mut self, other: &Graph) {
        for triple in other.iter() {
            self.insert(triple.clone());
        }
    }

    /// Merge a graph parsed from a separate document.
    ///
    /// Blank nodes of `other` that collide with labels already used here are
    /// relabelled so that distinct documents never share anonymous nodes.
    pub fn merge(&mut self, other: Graph) {
        let taken: HashSet<String> = self.blank_nodes().into_iter().map(str::to_string).collect();
        if taken.is_empty() {
            for triple in other.triples {
                self.insert(triple);
            }
            return;
        }

        let incoming: HashSet<String> = other.blank_nodes().into_iter().map(str::to_string).collect();
        let mut renames: HashMap<String, String> = HashMap::new();
        let mut counter = 0usize;
        for label in incoming.iter().filter(|label| taken.contains(*label)) {
            let fresh = loop {
                counter += 1;
                let candidate = format!("{}_m{}", label, counter);
                if !taken.contains(&candidate) && !incoming.contains(&candidate) {
                    break candidate;
                }
            };
            renames.insert(label.clone(), fresh);
        }

        let relabel = |term: Term| match term {
            Term::BlankNode(label) => match renames.get(&label) {
                Some(fresh) => Term::BlankNode(fresh.clone()),
                None => Term::BlankNode(label),
            },
            other => other,
        };

        for triple in other.triples {
            self.insert(Triple::new(
                relabel(triple.subject),
                triple.predicate,
                relabel(triple.object),
            ));
        }
    }

    /// Every statement reachable from `subject` by following objects as the
    /// next subjects. Each subject is expanded once, so cycles terminate.
    pub fn subject_closure(&self, subject: &Term) -> Graph {
        let mut result = Graph::new();
        let mut visited: HashSet<&Term> = HashSet::new();
        let mut pending: Vec<&Term> = vec![subject];

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            for triple in self.find_triples(Some(current), None, None) {
                result.insert(triple.clone());
                if triple.object.is_resource() && !visited.contains(&triple.object) {
                    pending.push(&triple.object);
                }
            }
        }

        result
    }

    /// Keep only the triples matching `keep`, rebuilding the indices
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Triple) -> bool,
    {
        let triples = std::mem::take(&mut self.triples);
        self.clear();
        for triple in triples {
            if keep(&triple) {
                self.insert(triple);
            }
        }
    }

    /// Distinct blank node labels used anywhere in the graph
    pub fn blank_nodes(&self) -> HashSet<&str> {
        self.triples
            .iter()
            .flat_map(|triple| [&triple.subject, &triple.object])
            .filter_map(Term::as_blank_node)
            .collect()
    }

    /// Clear all triples and indices
    pub fn clear(&mut self) {
        self.triples.clear();
        self.positions.clear();
        self.subject_index.clear();
        self.predicate_index.clear();
        self.object_index.clear();
    }
}

/// Intersect two ascending index vectors
fn intersect_indices(a: &[usize], b: &[usize]) -> Positions {
    let mut result = SmallVec::new();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|triple| other.contains(triple))
    }
}

impl Eq for Graph {}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{}", s))
    }

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut graph = Graph::new();
        assert!(graph.insert(t("s", "p", "o")));
        assert!(!graph.insert(t("s", "p", "o")));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_find_triples_by_pattern() {
        let graph: Graph = vec![t("s1", "p1", "o1"), t("s1", "p2", "o2"), t("s2", "p1", "o1")]
            .into_iter()
            .collect();

        assert_eq!(graph.find_triples(Some(&iri("s1")), None, None).len(), 2);
        assert_eq!(graph.find_triples(None, Some(&iri("p1")), None).len(), 2);
        assert_eq!(graph.find_triples(None, None, Some(&iri("o2"))).len(), 1);
        assert_eq!(graph.find_triples(Some(&iri("s1")), Some(&iri("p1")), None).len(), 1);
        assert_eq!(
            graph.find_triples(Some(&iri("s2")), Some(&iri("p1")), Some(&iri("o1"))),
            vec![&t("s2", "p1", "o1")]
        );
        assert_eq!(graph.find_triples(None, None, None).len(), 3);
        assert!(graph.find_triples(Some(&iri("missing")), None, None).is_empty());
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a: Graph = vec![t("s", "p", "o1"), t("s", "p", "o2")].into_iter().collect();
        let b: Graph = vec![t("s", "p", "o2"), t("s", "p", "o1")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_union_in_place() {
        let mut a: Graph = vec![t("s", "p", "o1")].into_iter().collect();
        let b: Graph = vec![t("s", "p", "o1"), t("s", "p", "o2")].into_iter().collect();
        a.union(&b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_merge_relabels_colliding_blank_nodes() {
        let mut a = Graph::new();
        a.insert(Triple::new(Term::blank("b0"), iri("p"), Term::literal("first")));
        let mut b = Graph::new();
        b.insert(Triple::new(Term::blank("b0"), iri("p"), Term::literal("second")));

        a.merge(b);

        assert_eq!(a.len(), 2);
        assert_eq!(a.blank_nodes().len(), 2);
        assert_eq!(a.find_triples(Some(&Term::blank("b0")), None, None).len(), 1);
    }

    #[test]
    fn test_subject_closure_follows_nested_nodes() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(iri("anno"), iri("hasBody"), Term::blank("body")));
        graph.insert(Triple::new(Term::blank("body"), iri("chars"), Term::literal("text")));
        graph.insert(Triple::new(Term::blank("body"), iri("part"), Term::blank("nested")));
        graph.insert(Triple::new(Term::blank("nested"), iri("value"), Term::literal("inner")));
        graph.insert(t("unrelated", "p", "o"));

        let closure = graph.subject_closure(&Term::blank("body"));
        assert_eq!(closure.len(), 3);
        assert!(!closure.contains(&t("unrelated", "p", "o")));
    }

    #[test]
    fn test_subject_closure_terminates_on_cycle() {
        let graph: Graph = vec![t("a", "next", "b"), t("b", "next", "a")].into_iter().collect();

        let closure = graph.subject_closure(&iri("a"));
        assert_eq!(closure.len(), 2);
        assert!(closure.contains(&t("a", "next", "b")));
        assert!(closure.contains(&t("b", "next", "a")));
    }

    #[test]
    fn test_retain_rebuilds_indices() {
        let mut graph: Graph = vec![t("s", "p", "o1"), t("s", "p", "o2"), t("x", "p", "o1")]
            .into_iter()
            .collect();

        graph.retain(|triple| triple.subject == iri("s"));

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.find_triples(None, None, Some(&iri("o1"))).len(), 1);
        assert!(graph.find_triples(Some(&iri("x")), None, None).is_empty());
    }
}
