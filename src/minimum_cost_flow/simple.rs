use crate::graph::static_graph::StaticGraph;
use crate::minimum_cost_flow::cost_scaling_push_relabel::GenericMinCostFlow;
use crate::minimum_cost_flow::status::Status;
use num_traits::{Bounded, CheckedMul, FromPrimitive, NumAssign, Signed};
use std::fmt::Debug;

/// Thin driver around [`GenericMinCostFlow`] that hides the construction of
/// the static graph.
///
/// Node indices are created lazily: referencing a node in
/// [`add_arc`](SimpleMinCostFlow::add_arc) or
/// [`set_node_supply`](SimpleMinCostFlow::set_node_supply) grows the node
/// arrays as needed. Arcs must exist before their cost or capacity is set.
/// A fresh arc has a unit cost and a capacity of zero.
pub struct SimpleMinCostFlow<F> {
    arc_tail: Vec<usize>,
    arc_head: Vec<usize>,
    arc_capacity: Vec<F>,
    arc_unit_cost: Vec<F>,
    node_supply: Vec<F>,
    arc_flow: Vec<F>,
    optimal_cost: Option<F>,
    status: Status,
    use_price_update: bool,
    check_feasibility: bool,
}

impl<F> Default for SimpleMinCostFlow<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> SimpleMinCostFlow<F> {
    pub fn new() -> Self {
        Self {
            arc_tail: Vec::new(),
            arc_head: Vec::new(),
            arc_capacity: Vec::new(),
            arc_unit_cost: Vec::new(),
            node_supply: Vec::new(),
            arc_flow: Vec::new(),
            optimal_cost: None,
            status: Status::NotSolved,
            use_price_update: true,
            check_feasibility: true,
        }
    }
}

impl<F> SimpleMinCostFlow<F>
where
    F: NumAssign + Signed + Ord + Copy + Bounded + CheckedMul + FromPrimitive + Debug,
{
    /// Adds an arc from `tail` to `head` and returns its index, which is
    /// always the previous `num_arcs()`.
    pub fn add_arc(&mut self, tail: usize, head: usize) -> usize {
        self.reserve_node(tail.max(head));
        self.arc_tail.push(tail);
        self.arc_head.push(head);
        self.arc_capacity.push(F::zero());
        self.arc_unit_cost.push(F::zero());
        self.status = Status::NotSolved;
        self.arc_tail.len() - 1
    }

    /// Sets the supply of `node`. A demand is a negative supply.
    pub fn set_node_supply(&mut self, node: usize, supply: F) {
        self.reserve_node(node);
        self.node_supply[node] = supply;
        self.status = Status::NotSolved;
    }

    pub fn set_arc_unit_cost(&mut self, arc: usize, unit_cost: F) {
        self.arc_unit_cost[arc] = unit_cost;
        self.status = Status::NotSolved;
    }

    pub fn set_arc_capacity(&mut self, arc: usize, capacity: F) {
        assert!(capacity >= F::zero());
        self.arc_capacity[arc] = capacity;
        self.status = Status::NotSolved;
    }

    pub fn set_use_price_update(&mut self, value: bool) {
        self.use_price_update = value;
    }

    pub fn set_check_feasibility(&mut self, value: bool) {
        self.check_feasibility = value;
    }

    pub fn solve(&mut self) -> Status {
        let graph = StaticGraph::build(self.node_supply.len(), &self.arc_tail, &self.arc_head);
        let mut solver = GenericMinCostFlow::new(&graph);
        solver.set_use_price_update(self.use_price_update);
        solver.set_check_feasibility(self.check_feasibility);
        for (node, &supply) in self.node_supply.iter().enumerate() {
            solver.set_node_supply(node, supply);
        }
        for arc in 0..self.arc_tail.len() {
            solver.set_arc_capacity(arc, self.arc_capacity[arc]);
            solver.set_arc_unit_cost(arc, self.arc_unit_cost[arc]);
        }

        self.status = solver.solve();
        if self.status == Status::Optimal {
            self.optimal_cost = solver.optimal_cost();
            self.arc_flow = (0..self.arc_tail.len()).map(|arc| solver.flow(arc)).collect();
        } else {
            self.optimal_cost = None;
            self.arc_flow.clear();
        }
        self.status
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.node_supply.len()
    }

    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.arc_tail.len()
    }

    #[inline]
    pub fn tail(&self, arc: usize) -> usize {
        self.arc_tail[arc]
    }

    #[inline]
    pub fn head(&self, arc: usize) -> usize {
        self.arc_head[arc]
    }

    #[inline]
    pub fn capacity(&self, arc: usize) -> F {
        self.arc_capacity[arc]
    }

    #[inline]
    pub fn unit_cost(&self, arc: usize) -> F {
        self.arc_unit_cost[arc]
    }

    #[inline]
    pub fn supply(&self, node: usize) -> F {
        self.node_supply[node]
    }

    /// Flow on `arc`; only meaningful after a successful
    /// [`solve`](SimpleMinCostFlow::solve).
    #[inline]
    pub fn flow(&self, arc: usize) -> F {
        self.arc_flow.get(arc).copied().unwrap_or_else(F::zero)
    }

    pub fn optimal_cost(&self) -> Option<F> {
        self.optimal_cost
    }

    pub fn status(&self) -> Status {
        self.status
    }

    fn reserve_node(&mut self, node: usize) {
        if node >= self.node_supply.len() {
            self.node_supply.resize(node + 1, F::zero());
        }
    }
}
