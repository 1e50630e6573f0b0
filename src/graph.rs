//! Producer → consumer connectivity between LUTs.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::netlist::Netlist;

/// Directed LUT graph: an edge `i -> j` exists iff the output of LUT `i`
/// is one of the inputs of LUT `j`.
///
/// Derived from a netlist and never edited by hand. Only producers with at
/// least one consumer appear as keys; consumer lists are sorted and free of
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityGraph {
    edges: BTreeMap<usize, Vec<usize>>,
}

impl ConnectivityGraph {
    /// Derives the graph of `netlist` in a single pass over its LUT inputs.
    pub fn connect(netlist: &Netlist) -> Self {
        let mut edges: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for (consumer, lut) in netlist.iter() {
            for input in lut.inputs() {
                match netlist.producer(input) {
                    Some(producer) if producer != consumer => {
                        edges.entry(producer).or_default().insert(consumer);
                    }
                    // Primary input, or a self-reference.
                    _ => {}
                }
            }
        }
        let graph = Self {
            edges: edges
                .into_iter()
                .map(|(producer, consumers)| (producer, consumers.into_iter().collect()))
                .collect(),
        };
        debug!("connect(luts = {}) -> {} edges", netlist.len(), graph.num_edges());
        graph
    }

    /// Rebuilds a graph from an adjacency map, normalising it
    /// (sorted, deduplicated, no empty lists, no self-edges).
    pub fn from_adjacency(adjacency: BTreeMap<usize, Vec<usize>>) -> Self {
        let edges = adjacency
            .into_iter()
            .filter_map(|(producer, consumers)| {
                let consumers: BTreeSet<usize> = consumers.into_iter().filter(|&c| c != producer).collect();
                if consumers.is_empty() {
                    None
                } else {
                    Some((producer, consumers.into_iter().collect()))
                }
            })
            .collect();
        Self { edges }
    }

    pub fn adjacency(&self) -> &BTreeMap<usize, Vec<usize>> {
        &self.edges
    }

    /// Consumers fed by LUT `producer`.
    pub fn consumers(&self, producer: usize) -> &[usize] {
        self.edges.get(&producer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Producers feeding LUT `consumer`, ascending.
    pub fn producers(&self, consumer: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(_, consumers)| consumers.binary_search(&consumer).is_ok())
            .map(|(&producer, _)| producer)
            .collect()
    }

    pub fn contains(&self, producer: usize, consumer: usize) -> bool {
        self.consumers(producer).binary_search(&consumer).is_ok()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .flat_map(|(&producer, consumers)| consumers.iter().map(move |&consumer| (producer, consumer)))
    }

    pub fn num_edges(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{build_netlist, MapperConfig};
    use crate::sop::SopSpec;

    fn graph_of(text: &str) -> (Netlist, ConnectivityGraph) {
        let spec = SopSpec::parse(text).unwrap();
        let (netlist, _, _) = build_netlist(&spec, &MapperConfig::default()).unwrap();
        let graph = ConnectivityGraph::connect(&netlist);
        (netlist, graph)
    }

    #[test]
    fn test_fan_in() {
        let (netlist, graph) = graph_of("X=a*c+a*c*b+b*d");
        assert_eq!(graph.num_edges(), 3);
        let last = netlist.len() - 1;
        assert!(graph.edges().all(|(_, consumer)| consumer == last));
        assert_eq!(graph.producers(last), vec![0, 1, 2]);
    }

    #[test]
    fn test_edge_iff_output_is_input() {
        let (netlist, graph) = graph_of("X=a*c+b*d\nY=X*d\nZ=X*a+X*c*d+Y\nW=X*Y*Z+X*Z*a");
        for (i, producer) in netlist.iter() {
            for (j, consumer) in netlist.iter() {
                let expected = i != j && consumer.inputs().iter().any(|name| name == producer.output());
                assert_eq!(graph.contains(i, j), expected, "edge {} -> {}", i, j);
            }
        }
    }

    #[test]
    fn test_no_duplicate_edges() {
        // `X` feeds both terms of `Y`, then both reach the OR stage once each.
        let (netlist, graph) = graph_of("X=a*b\nY=X*c+X*d");
        let x = netlist.producer("X").unwrap();
        assert_eq!(graph.consumers(x).len(), 2);
        let total: usize = graph.adjacency().values().map(Vec::len).sum();
        assert_eq!(total, graph.num_edges());
    }

    #[test]
    fn test_from_adjacency_normalises() {
        let adjacency: BTreeMap<usize, Vec<usize>> = [(0, vec![2, 1, 2, 0]), (3, vec![])].into_iter().collect();
        let graph = ConnectivityGraph::from_adjacency(adjacency);
        assert_eq!(graph.consumers(0), &[1, 2]);
        assert_eq!(graph.adjacency().len(), 1);
    }
}
