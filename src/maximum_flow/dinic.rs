use crate::graph::traits::ReverseArcGraph;
use crate::maximum_flow::status::Status;
use num_traits::NumAssign;
use std::collections::VecDeque;

/// Dinic's algorithm over a [`ReverseArcGraph`].
///
/// Shares the residual-capacity layout of the minimum-cost flow solver: one
/// entry per internal arc, with `flow(e) = residual_arc_capacity[2 * e + 1]`.
pub struct GenericMaxFlow<'a, F, G> {
    graph: &'a G,
    source: usize,
    sink: usize,
    residual_arc_capacity: Vec<F>,
    distances: Vec<usize>,
    current_arc: Vec<usize>,
    status: Status,
    que: VecDeque<usize>,
}

impl<'a, F, G> GenericMaxFlow<'a, F, G>
where
    F: NumAssign + Ord + Copy,
    G: ReverseArcGraph,
{
    pub fn new(graph: &'a G, source: usize, sink: usize) -> Self {
        Self {
            graph,
            source,
            sink,
            residual_arc_capacity: vec![F::zero(); 2 * graph.num_arcs()],
            distances: vec![0; graph.num_nodes()],
            current_arc: vec![0; graph.num_nodes()],
            status: Status::NotSolved,
            que: VecDeque::new(),
        }
    }

    pub fn set_arc_capacity(&mut self, edge: usize, capacity: F) {
        assert!(capacity >= F::zero());
        let arc = self.graph.forward_arc(edge);
        self.residual_arc_capacity[arc] = capacity;
        self.residual_arc_capacity[self.graph.opposite(arc)] = F::zero();
        self.status = Status::NotSolved;
    }

    /// Flow on forward input arc `edge`.
    pub fn flow(&self, edge: usize) -> F {
        let arc = self.graph.forward_arc(edge);
        self.residual_arc_capacity[self.graph.opposite(arc)]
    }

    /// Net flow out of the source.
    pub fn optimal_flow(&self) -> F {
        let graph = self.graph;
        (0..graph.num_arcs()).fold(F::zero(), |sum, edge| {
            let arc = graph.forward_arc(edge);
            if graph.tail(arc) == self.source {
                sum + self.flow(edge)
            } else if graph.head(arc) == self.source {
                sum - self.flow(edge)
            } else {
                sum
            }
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn solve(&mut self) -> Status {
        let num_nodes = self.graph.num_nodes();
        if self.source >= num_nodes || self.sink >= num_nodes || self.source == self.sink {
            self.status = Status::BadInput;
            return self.status;
        }

        let graph = self.graph;
        let upper = graph
            .incident_arcs(self.source)
            .iter()
            .fold(F::zero(), |sum, &arc| sum + self.residual_arc_capacity[arc]);

        loop {
            self.update_distances();

            // no s-t path left
            if self.distances[self.source] >= num_nodes {
                break;
            }

            self.current_arc.fill(0);
            if self.dfs(self.source, upper) == F::zero() {
                break;
            }
        }

        self.status = Status::Optimal;
        self.status
    }

    // O(n + m)
    // distance from u to the sink in the residual network; unreachable nodes
    // end up at num_nodes
    fn update_distances(&mut self) {
        let graph = self.graph;
        let num_nodes = graph.num_nodes();
        self.que.clear();
        self.que.push_back(self.sink);
        self.distances.fill(num_nodes);
        self.distances[self.sink] = 0;

        while let Some(v) = self.que.pop_front() {
            for &arc in graph.incident_arcs(v) {
                // opposite(arc) runs head(arc) -> v
                let u = graph.head(arc);
                if self.residual_arc_capacity[graph.opposite(arc)] > F::zero() && self.distances[u] == num_nodes {
                    self.distances[u] = self.distances[v] + 1;
                    if u != self.source {
                        self.que.push_back(u);
                    }
                }
            }
        }
    }

    fn dfs(&mut self, u: usize, upper: F) -> F {
        if u == self.sink {
            return upper;
        }
        let graph = self.graph;
        let incident = graph.incident_arcs(u);

        let mut res = F::zero();
        for pos in self.current_arc[u]..incident.len() {
            self.current_arc[u] = pos;
            let arc = incident[pos];
            let v = graph.head(arc);
            let residual = self.residual_arc_capacity[arc];

            if residual == F::zero() || self.distances[u] != self.distances[v] + 1 {
                continue;
            }

            let delta = self.dfs(v, residual.min(upper - res));
            if delta > F::zero() {
                self.push_flow(arc, delta);
                res += delta;
                if res == upper {
                    return res;
                }
            }
        }
        self.current_arc[u] = incident.len();
        self.distances[u] = graph.num_nodes();

        res
    }

    #[inline]
    fn push_flow(&mut self, arc: usize, flow: F) {
        self.residual_arc_capacity[arc] -= flow;
        self.residual_arc_capacity[self.graph.opposite(arc)] += flow;
    }
}
