use crate::graph::static_graph::StaticGraph;
use crate::graph::traits::ReverseArcGraph;
use crate::maximum_flow::dinic::GenericMaxFlow;
use crate::minimum_cost_flow::status::Status;
use log::{debug, error, trace};
use num_traits::{Bounded, CheckedMul, FromPrimitive, NumAssign, Signed};
use std::fmt::Debug;

/// Minimum-cost flow solver based on the Goldberg-Tarjan cost-scaling
/// push-relabel algorithm.
///
/// The solver works on pseudo-flows: a node's outflow minus its inflow may
/// temporarily differ from its supply, the difference being its excess (a
/// deficit when negative). Each refine step turns the current pseudo-flow into
/// an epsilon-optimal flow, where epsilon-optimality means that every residual
/// arc has a reduced cost of at least `-epsilon` under the node potentials.
/// Costs are scaled by `num_nodes + 1` up front, so that reaching
/// `epsilon == 1` proves the flow optimal for the original integer costs.
///
/// Capacity and flow are carried in a single residual-capacity array: for a
/// forward arc `residual == capacity - flow`, and the flow itself is the
/// residual capacity of the paired reverse arc.
///
/// The algorithm cannot detect infeasibility on its own and may loop on an
/// infeasible instance, which is why [`solve`](GenericMinCostFlow::solve) runs
/// a max-flow feasibility check first unless
/// [`set_check_feasibility`](GenericMinCostFlow::set_check_feasibility) turned
/// it off.
pub struct GenericMinCostFlow<'a, F, G> {
    graph: &'a G,
    alpha: F,
    epsilon: F,
    cost_scaling_factor: F,
    node_excess: Vec<F>,
    node_potential: Vec<F>,
    residual_arc_capacity: Vec<F>,
    scaled_arc_unit_cost: Vec<F>,
    first_admissible_arc: Vec<usize>,
    active_nodes: Vec<usize>,
    initial_node_excess: Vec<F>,
    feasible_node_excess: Vec<F>,
    total_flow_cost: F,
    status: Status,
    num_relabels_since_last_price_update: usize,
    feasibility_checked: bool,
    use_price_update: bool,
    check_feasibility_enabled: bool,
}

impl<'a, F, G> GenericMinCostFlow<'a, F, G>
where
    F: NumAssign + Signed + Ord + Copy + Bounded + CheckedMul + FromPrimitive + Debug,
    G: ReverseArcGraph,
{
    pub fn new(graph: &'a G) -> Self {
        let num_nodes = graph.num_nodes();
        let num_arcs = graph.num_arcs();
        Self {
            graph,
            alpha: F::from_i64(5).unwrap(),
            epsilon: F::zero(),
            cost_scaling_factor: F::one(),
            node_excess: vec![F::zero(); num_nodes],
            node_potential: vec![F::zero(); num_nodes],
            residual_arc_capacity: vec![F::zero(); 2 * num_arcs],
            scaled_arc_unit_cost: vec![F::zero(); 2 * num_arcs],
            first_admissible_arc: vec![0; num_nodes],
            active_nodes: Vec::new(),
            initial_node_excess: vec![F::zero(); num_nodes],
            feasible_node_excess: vec![F::zero(); num_nodes],
            total_flow_cost: F::zero(),
            status: Status::NotSolved,
            num_relabels_since_last_price_update: 0,
            feasibility_checked: false,
            use_price_update: true,
            check_feasibility_enabled: true,
        }
    }

    /// Sets the supply of `node`. A demand is a negative supply.
    pub fn set_node_supply(&mut self, node: usize, supply: F) {
        self.node_excess[node] = supply;
        self.initial_node_excess[node] = supply;
        self.status = Status::NotSolved;
        self.feasibility_checked = false;
    }

    pub fn set_arc_unit_cost(&mut self, edge: usize, unit_cost: F) {
        let arc = self.graph.forward_arc(edge);
        self.scaled_arc_unit_cost[arc] = unit_cost;
        self.scaled_arc_unit_cost[self.graph.opposite(arc)] = -unit_cost;
        self.status = Status::NotSolved;
    }

    pub fn set_arc_capacity(&mut self, edge: usize, new_capacity: F) {
        assert!(new_capacity >= F::zero());
        let arc = self.graph.forward_arc(edge);
        let opposite = self.graph.opposite(arc);
        let flow = self.residual_arc_capacity[opposite];
        if new_capacity >= flow {
            self.residual_arc_capacity[arc] = new_capacity - flow;
        } else {
            // the current flow no longer fits: trim it to the new capacity
            let trimmed = flow - new_capacity;
            self.residual_arc_capacity[arc] = F::zero();
            self.residual_arc_capacity[opposite] = new_capacity;
            self.node_excess[self.graph.tail(arc)] += trimmed;
            self.node_excess[self.graph.head(arc)] -= trimmed;
        }
        self.status = Status::NotSolved;
        self.feasibility_checked = false;
    }

    /// Presets the flow on a forward arc (warm start). Residual capacities and
    /// node excesses are adjusted so that conservation still holds.
    pub fn set_arc_flow(&mut self, edge: usize, new_flow: F) {
        assert!(new_flow >= F::zero());
        let capacity = self.capacity(edge);
        assert!(new_flow <= capacity);
        let arc = self.graph.forward_arc(edge);
        let opposite = self.graph.opposite(arc);
        let delta = new_flow - self.residual_arc_capacity[opposite];
        self.residual_arc_capacity[opposite] = new_flow;
        self.residual_arc_capacity[arc] = capacity - new_flow;
        self.node_excess[self.graph.tail(arc)] -= delta;
        self.node_excess[self.graph.head(arc)] += delta;
        self.status = Status::NotSolved;
    }

    /// Flow on forward input arc `edge`.
    #[inline]
    pub fn flow(&self, edge: usize) -> F {
        let arc = self.graph.forward_arc(edge);
        self.residual_arc_capacity[self.graph.opposite(arc)]
    }

    #[inline]
    pub fn capacity(&self, edge: usize) -> F {
        let arc = self.graph.forward_arc(edge);
        self.residual_arc_capacity[arc] + self.residual_arc_capacity[self.graph.opposite(arc)]
    }

    /// Unscaled unit cost of a forward input arc.
    #[inline]
    pub fn unit_cost(&self, edge: usize) -> F {
        self.scaled_arc_unit_cost[self.graph.forward_arc(edge)] / self.cost_scaling_factor
    }

    /// Current excess at `node`; equals the supply before `solve` and zero
    /// after a successful one.
    #[inline]
    pub fn supply(&self, node: usize) -> F {
        self.node_excess[node]
    }

    #[inline]
    pub fn initial_supply(&self, node: usize) -> F {
        self.initial_node_excess[node]
    }

    /// Largest supply (or demand, in absolute value) admissible at `node`
    /// according to the last feasibility check.
    #[inline]
    pub fn feasible_supply(&self, node: usize) -> F {
        self.feasible_node_excess[node]
    }

    pub fn optimal_cost(&self) -> Option<F> {
        if self.status == Status::Optimal {
            Some(self.total_flow_cost)
        } else {
            None
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether to use the global price-update heuristic.
    pub fn set_use_price_update(&mut self, value: bool) {
        self.use_price_update = value;
    }

    /// Whether `solve` runs the max-flow feasibility check first. Disabling it
    /// removes the only guard against nontermination on infeasible instances.
    pub fn set_check_feasibility(&mut self, value: bool) {
        self.check_feasibility_enabled = value;
    }

    pub fn solve(&mut self) -> Status {
        self.status = Status::NotSolved;
        if !self.check_input_consistency() {
            self.status = Status::Unbalanced;
            return self.status;
        }
        if self.check_feasibility_enabled && !self.check_feasibility(None, None) {
            self.status = Status::Infeasible;
            return self.status;
        }
        if !self.check_cost_range() {
            self.status = Status::BadCostRange;
            return self.status;
        }

        self.node_potential.fill(F::zero());
        self.reset_first_admissible_arcs();
        self.scale_costs();
        self.optimize();
        if self.status == Status::Infeasible {
            self.unscale_costs();
            return self.status;
        }

        let result_ok = self.check_result();
        self.unscale_costs();
        if !result_ok {
            self.status = Status::BadResult;
            return self.status;
        }

        let mut total = F::zero();
        for edge in 0..self.graph.num_arcs() {
            total += self.flow(edge) * self.unit_cost(edge);
        }
        self.total_flow_cost = total;
        self.status = Status::Optimal;
        self.status
    }

    /// Checks that all supplies and demands can be matched without exceeding
    /// the network's bottlenecks, by solving a max-flow instance from a
    /// super-source feeding the supply nodes to a super-sink draining the
    /// demand nodes. The out-lists, when given, receive the nodes whose supply
    /// (resp. demand) cannot be fully routed; the per-node values that are
    /// achievable become available through
    /// [`feasible_supply`](GenericMinCostFlow::feasible_supply).
    pub fn check_feasibility(
        &mut self,
        mut infeasible_supply_node: Option<&mut Vec<usize>>,
        mut infeasible_demand_node: Option<&mut Vec<usize>>,
    ) -> bool {
        let graph = self.graph;
        let num_nodes = graph.num_nodes();
        let num_arcs = graph.num_arcs();
        let source = num_nodes;
        let sink = num_nodes + 1;

        let mut tails = Vec::with_capacity(num_arcs + num_nodes);
        let mut heads = Vec::with_capacity(num_arcs + num_nodes);
        for edge in 0..num_arcs {
            let arc = graph.forward_arc(edge);
            tails.push(graph.tail(arc));
            heads.push(graph.head(arc));
        }
        let mut supply_arcs = Vec::new();
        let mut demand_arcs = Vec::new();
        for node in 0..num_nodes {
            let supply = self.initial_node_excess[node];
            if supply > F::zero() {
                supply_arcs.push((node, tails.len()));
                tails.push(source);
                heads.push(node);
            } else if supply < F::zero() {
                demand_arcs.push((node, tails.len()));
                tails.push(node);
                heads.push(sink);
            }
        }

        let checker_graph = StaticGraph::build(num_nodes + 2, &tails, &heads);
        let mut max_flow = GenericMaxFlow::new(&checker_graph, source, sink);
        for edge in 0..num_arcs {
            max_flow.set_arc_capacity(edge, self.capacity(edge));
        }
        for &(node, edge) in &supply_arcs {
            max_flow.set_arc_capacity(edge, self.initial_node_excess[node]);
        }
        for &(node, edge) in &demand_arcs {
            max_flow.set_arc_capacity(edge, -self.initial_node_excess[node]);
        }

        max_flow.solve();
        self.feasibility_checked = true;

        let mut feasible = true;
        self.feasible_node_excess.fill(F::zero());
        for &(node, edge) in &supply_arcs {
            let routed = max_flow.flow(edge);
            self.feasible_node_excess[node] = routed;
            if routed != self.initial_node_excess[node] {
                feasible = false;
                if let Some(list) = infeasible_supply_node.as_deref_mut() {
                    list.push(node);
                }
            }
        }
        for &(node, edge) in &demand_arcs {
            let routed = max_flow.flow(edge);
            self.feasible_node_excess[node] = -routed;
            if routed != -self.initial_node_excess[node] {
                feasible = false;
                if let Some(list) = infeasible_demand_node.as_deref_mut() {
                    list.push(node);
                }
            }
        }
        debug!("feasibility check: routed {:?} of the supplies, feasible={}", max_flow.optimal_flow(), feasible);
        feasible
    }

    /// Truncates supplies and demands to the levels found by the last
    /// [`check_feasibility`](GenericMinCostFlow::check_feasibility), making
    /// the instance solvable. Returns false when no check has run.
    pub fn make_feasible(&mut self) -> bool {
        if !self.feasibility_checked {
            return false;
        }
        for node in 0..self.graph.num_nodes() {
            let excess = self.feasible_node_excess[node];
            self.node_excess[node] = excess;
            self.initial_node_excess[node] = excess;
        }
        self.status = Status::NotSolved;
        true
    }

    #[inline]
    fn reduced_cost(&self, arc: usize) -> F {
        self.fast_reduced_cost(arc, self.node_potential[self.graph.tail(arc)])
    }

    #[inline]
    fn fast_reduced_cost(&self, arc: usize, tail_potential: F) -> F {
        self.scaled_arc_unit_cost[arc] + tail_potential - self.node_potential[self.graph.head(arc)]
    }

    #[inline]
    fn is_admissible(&self, arc: usize) -> bool {
        self.fast_is_admissible(arc, self.node_potential[self.graph.tail(arc)])
    }

    #[inline]
    fn fast_is_admissible(&self, arc: usize, tail_potential: F) -> bool {
        self.residual_arc_capacity[arc] > F::zero() && self.fast_reduced_cost(arc, tail_potential) < F::zero()
    }

    #[inline]
    fn is_active(&self, node: usize) -> bool {
        self.node_excess[node] > F::zero()
    }

    #[inline]
    fn fast_push_flow(&mut self, flow: F, arc: usize, tail: usize) {
        debug_assert!(flow > F::zero());
        debug_assert!(flow <= self.residual_arc_capacity[arc]);
        self.residual_arc_capacity[arc] -= flow;
        self.residual_arc_capacity[self.graph.opposite(arc)] += flow;
        self.node_excess[tail] -= flow;
        self.node_excess[self.graph.head(arc)] += flow;
    }

    fn check_input_consistency(&self) -> bool {
        let mut total_supply = F::zero();
        for &supply in &self.initial_node_excess {
            total_supply += supply;
        }
        total_supply == F::zero()
    }

    // the scaled costs and the quantities derived from them must fit the flow
    // type; checked before anything is mutated
    fn check_cost_range(&self) -> bool {
        let mut max_cost_magnitude = F::zero();
        let mut max_capacity = F::zero();
        for edge in 0..self.graph.num_arcs() {
            max_cost_magnitude = max_cost_magnitude.max(self.unit_cost(edge).abs());
            max_capacity = max_capacity.max(self.capacity(edge));
        }
        let factor = match F::from_usize(self.graph.num_nodes() + 1) {
            Some(factor) => factor,
            None => return false,
        };
        match max_cost_magnitude.checked_mul(&factor) {
            Some(scaled) => scaled.checked_mul(&max_capacity.max(F::one())).is_some(),
            None => false,
        }
    }

    // every residual arc epsilon-optimal and every excess settled
    fn check_result(&self) -> bool {
        for node in 0..self.graph.num_nodes() {
            if self.node_excess[node] != F::zero() {
                return false;
            }
        }
        for arc in 0..2 * self.graph.num_arcs() {
            if self.residual_arc_capacity[arc] < F::zero() {
                return false;
            }
            if self.residual_arc_capacity[arc] > F::zero() && self.reduced_cost(arc) < -self.epsilon {
                return false;
            }
        }
        true
    }

    // to be used in a debug_assert
    fn check_relabel_precondition(&self, node: usize) -> bool {
        // active, or excess zero for the look-ahead relaxation
        if self.node_excess[node] < F::zero() {
            return false;
        }
        self.graph.incident_arcs(node).iter().all(|&arc| !self.is_admissible(arc))
    }

    fn reset_first_admissible_arcs(&mut self) {
        self.first_admissible_arc.fill(0);
    }

    fn scale_costs(&mut self) {
        self.cost_scaling_factor = F::from_usize(self.graph.num_nodes() + 1).unwrap();
        let mut max_magnitude = F::zero();
        for cost in self.scaled_arc_unit_cost.iter_mut() {
            *cost *= self.cost_scaling_factor;
            max_magnitude = max_magnitude.max(cost.abs());
        }
        self.epsilon = max_magnitude;
        debug!("scaled costs by {:?}, initial epsilon {:?}", self.cost_scaling_factor, self.epsilon);
    }

    fn unscale_costs(&mut self) {
        for cost in self.scaled_arc_unit_cost.iter_mut() {
            *cost /= self.cost_scaling_factor;
        }
        self.cost_scaling_factor = F::one();
    }

    fn optimize(&mut self) {
        self.num_relabels_since_last_price_update = 0;
        loop {
            self.epsilon = F::one().max(self.epsilon / self.alpha);
            trace!("refine at epsilon {:?}", self.epsilon);
            self.refine();
            if self.status == Status::Infeasible || self.epsilon == F::one() {
                break;
            }
        }
    }

    // push the full residual capacity of every admissible arc; the result is a
    // pseudo-flow with no admissible arc left, trivially epsilon-optimal
    fn saturate_admissible_arcs(&mut self) {
        let graph = self.graph;
        for node in 0..graph.num_nodes() {
            let tail_potential = self.node_potential[node];
            for &arc in graph.incident_arcs(node) {
                if self.fast_is_admissible(arc, tail_potential) {
                    let flow = self.residual_arc_capacity[arc];
                    self.fast_push_flow(flow, arc, node);
                }
            }
        }
    }

    fn initialize_active_node_stack(&mut self) {
        debug_assert!(self.active_nodes.is_empty());
        for node in 0..self.graph.num_nodes() {
            if self.is_active(node) {
                self.active_nodes.push(node);
            }
        }
    }

    // one epsilon-optimization step: saturate the admissible arcs, then
    // discharge active nodes until none remains
    fn refine(&mut self) {
        self.reset_first_admissible_arcs();
        self.saturate_admissible_arcs();
        self.initialize_active_node_stack();

        let num_nodes = self.graph.num_nodes();
        loop {
            if self.use_price_update && self.num_relabels_since_last_price_update >= num_nodes {
                self.update_prices();
            }
            let node = match self.active_nodes.pop() {
                Some(node) => node,
                None => break,
            };
            debug_assert!(self.is_active(node));
            self.discharge(node);
            if self.status == Status::Infeasible {
                self.active_nodes.clear();
                break;
            }
        }
    }

    fn discharge(&mut self, node: usize) {
        let graph = self.graph;
        loop {
            // the potential of node does not change while scanning
            let tail_potential = self.node_potential[node];
            let incident = graph.incident_arcs(node);
            for pos in self.first_admissible_arc[node]..incident.len() {
                let arc = incident[pos];
                if !self.fast_is_admissible(arc, tail_potential) {
                    continue;
                }
                let head = graph.head(arc);
                if !self.look_ahead(arc, tail_potential, head) {
                    // the head got relabeled and the arc is no longer
                    // admissible; keep probing the remaining arcs
                    continue;
                }
                let delta = self.node_excess[node].min(self.residual_arc_capacity[arc]);
                let head_was_active = self.is_active(head);
                self.fast_push_flow(delta, arc, node);
                if self.is_active(head) && !head_was_active {
                    self.active_nodes.push(head);
                }
                if self.node_excess[node] == F::zero() {
                    // arc may still be admissible
                    self.first_admissible_arc[node] = pos;
                    return;
                }
            }
            self.relabel(node);
            if self.status == Status::Infeasible {
                return;
            }
        }
    }

    // Push look-ahead: before pushing into node, make sure it can do something
    // with the flow. True when node runs a deficit or has an admissible arc at
    // its current potential. Otherwise node is relabeled, and the push goes
    // through only if in_arc stayed admissible.
    fn look_ahead(&mut self, in_arc: usize, in_tail_potential: F, node: usize) -> bool {
        debug_assert_eq!(self.graph.head(in_arc), node);
        if self.node_excess[node] < F::zero() {
            return true;
        }
        let graph = self.graph;
        let tail_potential = self.node_potential[node];
        let incident = graph.incident_arcs(node);
        for pos in self.first_admissible_arc[node]..incident.len() {
            if self.fast_is_admissible(incident[pos], tail_potential) {
                self.first_admissible_arc[node] = pos;
                return true;
            }
        }
        self.relabel(node);
        self.fast_is_admissible(in_arc, in_tail_potential)
    }

    // Lowers the potential of node just enough to make one of its residual
    // arcs admissible, which preserves epsilon-optimality. An arc becomes
    // admissible once the potential drops below `potential[head] - cost`, so
    // the target is the largest such bound minus epsilon; when a bound exceeds
    // `potential - epsilon`, dropping by a single epsilon is already enough.
    fn relabel(&mut self, node: usize) {
        debug_assert!(self.check_relabel_precondition(node));
        self.num_relabels_since_last_price_update += 1;

        let graph = self.graph;
        let guaranteed_new_potential = self.node_potential[node] - self.epsilon;
        let mut new_potential = F::min_value();
        let mut previous_potential = F::min_value();
        let mut new_cursor = None;

        let incident = graph.incident_arcs(node);
        for (pos, &arc) in incident.iter().enumerate() {
            if self.residual_arc_capacity[arc] > F::zero() {
                let admissibility_bound = self.node_potential[graph.head(arc)] - self.scaled_arc_unit_cost[arc];
                if admissibility_bound > new_potential {
                    if admissibility_bound > guaranteed_new_potential {
                        self.node_potential[node] = guaranteed_new_potential;
                        self.first_admissible_arc[node] = pos;
                        return;
                    }
                    previous_potential = new_potential;
                    new_potential = admissibility_bound;
                    new_cursor = Some(pos);
                }
            }
        }

        match new_cursor {
            Some(pos) => {
                let target = new_potential - self.epsilon;
                self.node_potential[node] = target;
                // arcs scanned before the cursor stay non-admissible only as
                // long as the second-largest bound cannot beat the new
                // potential
                self.first_admissible_arc[node] = if previous_potential > target { 0 } else { pos };
            }
            None => {
                // no residual arc leaves this node
                if self.node_excess[node] != F::zero() {
                    error!("node {} has excess {:?} but no residual arc to push it along", node, self.node_excess[node]);
                    self.status = Status::Infeasible;
                } else {
                    self.node_potential[node] = guaranteed_new_potential;
                    self.first_admissible_arc[node] = 0;
                }
            }
        }
    }

    // Global price update: grow a set from the deficit nodes along arcs that
    // could become admissible, lowering each absorbed node's potential by
    // epsilon per sweep round, so that one sweep does the work of many
    // individual relabels. Nodes that cannot reach a deficit get the full
    // decrease at the end. The join schedule keeps every entering residual arc
    // at a reduced cost of at least -epsilon.
    fn update_prices(&mut self) {
        let graph = self.graph;
        let num_nodes = graph.num_nodes();
        self.num_relabels_since_last_price_update = 0;

        let mut in_set = vec![false; num_nodes];
        // largest potential at which the node gains an admissible arc into
        // the set; min_value marks nodes not yet seen
        let mut entry_bound = vec![F::min_value(); num_nodes];
        let mut frontier: Vec<usize> = Vec::new();
        let mut candidates: Vec<usize> = Vec::new();
        let mut num_in_set = 0;

        for node in 0..num_nodes {
            if self.node_excess[node] < F::zero() {
                in_set[node] = true;
                num_in_set += 1;
                frontier.push(node);
            }
        }
        if num_in_set == 0 {
            return;
        }

        let mut delta = F::zero();
        loop {
            // absorb the frontier: record entry bounds for neighbors still
            // outside the set
            for node in frontier.drain(..) {
                for &arc in graph.incident_arcs(node) {
                    let neighbor = graph.head(arc);
                    if in_set[neighbor] {
                        continue;
                    }
                    let entering_arc = graph.opposite(arc);
                    if self.residual_arc_capacity[entering_arc] == F::zero() {
                        continue;
                    }
                    let bound = self.node_potential[node] - self.scaled_arc_unit_cost[entering_arc];
                    if entry_bound[neighbor] == F::min_value() {
                        candidates.push(neighbor);
                    }
                    entry_bound[neighbor] = entry_bound[neighbor].max(bound);
                }
            }

            // grow the set at the current delta
            let mut admitted = false;
            let mut index = 0;
            while index < candidates.len() {
                let node = candidates[index];
                if self.node_potential[node] - delta < entry_bound[node] {
                    candidates.swap_remove(index);
                    in_set[node] = true;
                    num_in_set += 1;
                    self.node_potential[node] -= delta;
                    frontier.push(node);
                    admitted = true;
                } else {
                    index += 1;
                }
            }
            if admitted {
                continue;
            }
            if candidates.is_empty() || num_in_set == num_nodes {
                break;
            }

            // stalled: jump to the next epsilon multiple at which a candidate
            // joins
            let mut min_required = F::max_value();
            for &node in &candidates {
                min_required = min_required.min(self.node_potential[node] - entry_bound[node]);
            }
            debug_assert!(min_required >= delta);
            let rounds = (min_required - delta) / self.epsilon + F::one();
            delta += rounds * self.epsilon;
        }

        // nodes that cannot reach a deficit get the full decrease, so that
        // arcs leaving the swept set keep their reduced costs nonnegative
        if num_in_set < num_nodes {
            for node in 0..num_nodes {
                if !in_set[node] {
                    self.node_potential[node] -= delta;
                }
            }
        }
        self.reset_first_admissible_arcs();
        trace!("price update lowered potentials by up to {:?}", delta);
    }
}
