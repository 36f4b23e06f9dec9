use flow_networks::minimum_cost_flow::simple::SimpleMinCostFlow;
use flow_networks::minimum_cost_flow::status::Status;

// capacities respected, conservation at every node, reported cost consistent
// with the flows
fn assert_valid_flow(solver: &SimpleMinCostFlow<i64>) {
    let mut net = vec![0i64; solver.num_nodes()];
    let mut cost = 0i64;
    for arc in 0..solver.num_arcs() {
        let flow = solver.flow(arc);
        assert!(flow >= 0, "arc {} carries negative flow {}", arc, flow);
        assert!(flow <= solver.capacity(arc), "arc {} overflows its capacity", arc);
        net[solver.tail(arc)] -= flow;
        net[solver.head(arc)] += flow;
        cost += flow * solver.unit_cost(arc);
    }
    for node in 0..solver.num_nodes() {
        assert_eq!(solver.supply(node) + net[node], 0, "conservation fails at node {}", node);
    }
    assert_eq!(solver.optimal_cost(), Some(cost));
}

#[test]
fn two_node_transshipment() {
    let mut solver = SimpleMinCostFlow::new();
    let arc = solver.add_arc(0, 1);
    solver.set_arc_capacity(arc, 5i64);
    solver.set_arc_unit_cost(arc, 3);
    solver.set_node_supply(0, 4);
    solver.set_node_supply(1, -4);

    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.flow(arc), 4);
    assert_eq!(solver.optimal_cost(), Some(12));
    assert_valid_flow(&solver);
}

#[test]
fn parallel_arcs_prefer_the_cheaper_one() {
    let mut solver = SimpleMinCostFlow::new();
    let expensive = solver.add_arc(0, 1);
    let cheap = solver.add_arc(0, 1);
    solver.set_arc_capacity(expensive, 3i64);
    solver.set_arc_unit_cost(expensive, 10);
    solver.set_arc_capacity(cheap, 3);
    solver.set_arc_unit_cost(cheap, 1);
    solver.set_node_supply(0, 3);
    solver.set_node_supply(1, -3);

    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.flow(cheap), 3);
    assert_eq!(solver.flow(expensive), 0);
    assert_eq!(solver.optimal_cost(), Some(3));
    assert_valid_flow(&solver);
}

#[test]
fn capacity_splits_the_flow() {
    let mut solver = SimpleMinCostFlow::new();
    let expensive = solver.add_arc(0, 1);
    let cheap = solver.add_arc(0, 1);
    solver.set_arc_capacity(expensive, 3i64);
    solver.set_arc_unit_cost(expensive, 10);
    solver.set_arc_capacity(cheap, 3);
    solver.set_arc_unit_cost(cheap, 1);
    solver.set_node_supply(0, 5);
    solver.set_node_supply(1, -5);

    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.flow(cheap), 3);
    assert_eq!(solver.flow(expensive), 2);
    assert_eq!(solver.optimal_cost(), Some(23));
    assert_valid_flow(&solver);
}

#[test]
fn infeasible_by_bottleneck() {
    let mut solver = SimpleMinCostFlow::new();
    for (tail, head) in [(0, 1), (1, 2)] {
        let arc = solver.add_arc(tail, head);
        solver.set_arc_capacity(arc, 1i64);
        solver.set_arc_unit_cost(arc, 1);
    }
    solver.set_node_supply(0, 2);
    solver.set_node_supply(2, -2);

    assert_eq!(solver.solve(), Status::Infeasible);
    assert_eq!(solver.optimal_cost(), None);

    // the truncated instance goes through
    solver.set_node_supply(0, 1);
    solver.set_node_supply(2, -1);
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.optimal_cost(), Some(2));
    assert_valid_flow(&solver);
}

#[test]
fn cheap_path_beats_the_direct_arc() {
    let mut solver = SimpleMinCostFlow::new();
    for (tail, head, cost) in [(0, 1, 1i64), (1, 2, 1), (2, 3, 1), (0, 3, 10)] {
        let arc = solver.add_arc(tail, head);
        solver.set_arc_capacity(arc, 2);
        solver.set_arc_unit_cost(arc, cost);
    }
    solver.set_node_supply(0, 2);
    solver.set_node_supply(3, -2);

    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.optimal_cost(), Some(6));
    assert_eq!(solver.flow(3), 0);
    assert_valid_flow(&solver);
}

#[test]
fn unbalanced_supplies() {
    let mut solver = SimpleMinCostFlow::new();
    let arc = solver.add_arc(0, 1);
    solver.set_arc_capacity(arc, 5i64);
    solver.set_node_supply(0, 1);

    assert_eq!(solver.solve(), Status::Unbalanced);
    assert_eq!(solver.optimal_cost(), None);
}

#[test]
fn empty_instance_is_optimal() {
    let mut solver = SimpleMinCostFlow::<i64>::new();
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.optimal_cost(), Some(0));
    assert_eq!(solver.num_nodes(), 0);
    assert_eq!(solver.num_arcs(), 0);
}

#[test]
fn disconnected_demand_is_infeasible() {
    let mut solver = SimpleMinCostFlow::new();
    let a = solver.add_arc(0, 1);
    let b = solver.add_arc(2, 3);
    solver.set_arc_capacity(a, 5i64);
    solver.set_arc_capacity(b, 5);
    solver.set_node_supply(0, 2);
    solver.set_node_supply(3, -2);

    assert_eq!(solver.solve(), Status::Infeasible);
}

#[test]
fn overflowing_costs_are_rejected_without_side_effects() {
    let mut solver = SimpleMinCostFlow::new();
    let arc = solver.add_arc(0, 1);
    solver.set_arc_capacity(arc, 1i64);
    solver.set_arc_unit_cost(arc, i64::MAX / 2);
    solver.set_node_supply(0, 1);
    solver.set_node_supply(1, -1);

    assert_eq!(solver.solve(), Status::BadCostRange);
    assert_eq!(solver.unit_cost(arc), i64::MAX / 2);
    assert_eq!(solver.capacity(arc), 1);

    solver.set_arc_unit_cost(arc, 2);
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.optimal_cost(), Some(2));
}

#[test]
fn set_then_get_round_trip() {
    let mut solver = SimpleMinCostFlow::new();
    let arc = solver.add_arc(3, 7);
    assert_eq!(solver.num_nodes(), 8);
    assert_eq!(solver.tail(arc), 3);
    assert_eq!(solver.head(arc), 7);
    assert_eq!(solver.capacity(arc), 0);
    assert_eq!(solver.unit_cost(arc), 0);

    solver.set_arc_capacity(arc, 42i64);
    solver.set_arc_unit_cost(arc, -13);
    solver.set_node_supply(5, 9);
    assert_eq!(solver.capacity(arc), 42);
    assert_eq!(solver.unit_cost(arc), -13);
    assert_eq!(solver.supply(5), 9);
    assert_eq!(solver.supply(0), 0);
}

// the mirror image of an instance routes the same flow at the same cost:
// reverse every arc and swap the roles of supplies and demands
#[test]
fn reversing_the_instance_preserves_the_cost() {
    let arcs = [(0usize, 1usize, 4i64, 2i64), (1, 2, 3, 5), (0, 2, 2, 9), (2, 3, 6, 1)];
    let supplies = [(0usize, 5i64), (3usize, -5i64)];

    let mut forward = SimpleMinCostFlow::new();
    for &(tail, head, capacity, cost) in &arcs {
        let arc = forward.add_arc(tail, head);
        forward.set_arc_capacity(arc, capacity);
        forward.set_arc_unit_cost(arc, cost);
    }
    for &(node, supply) in &supplies {
        forward.set_node_supply(node, supply);
    }

    let mut mirrored = SimpleMinCostFlow::new();
    for &(tail, head, capacity, cost) in &arcs {
        let arc = mirrored.add_arc(head, tail);
        mirrored.set_arc_capacity(arc, capacity);
        mirrored.set_arc_unit_cost(arc, cost);
    }
    for &(node, supply) in &supplies {
        mirrored.set_node_supply(node, -supply);
    }

    assert_eq!(forward.solve(), Status::Optimal);
    assert_eq!(mirrored.solve(), Status::Optimal);
    assert_eq!(forward.optimal_cost(), mirrored.optimal_cost());
    assert_valid_flow(&forward);
    assert_valid_flow(&mirrored);
}

#[test]
fn scaling_capacities_and_supplies_scales_the_cost() {
    let mut base_cost = None;
    for k in [1i64, 2, 5] {
        let mut solver = SimpleMinCostFlow::new();
        let expensive = solver.add_arc(0, 1);
        let cheap = solver.add_arc(0, 1);
        solver.set_arc_capacity(expensive, 3 * k);
        solver.set_arc_unit_cost(expensive, 10);
        solver.set_arc_capacity(cheap, 3 * k);
        solver.set_arc_unit_cost(cheap, 1);
        solver.set_node_supply(0, 5 * k);
        solver.set_node_supply(1, -5 * k);

        assert_eq!(solver.solve(), Status::Optimal);
        let cost = solver.optimal_cost().unwrap();
        match base_cost {
            None => base_cost = Some(cost),
            Some(base) => assert_eq!(cost, base * k),
        }
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let build = || {
        let mut solver = SimpleMinCostFlow::new();
        for (tail, head, capacity, cost) in
            [(0usize, 1usize, 4i64, 2i64), (1, 2, 3, 1), (0, 2, 2, 4), (2, 3, 6, 1), (1, 3, 2, 3)]
        {
            let arc = solver.add_arc(tail, head);
            solver.set_arc_capacity(arc, capacity);
            solver.set_arc_unit_cost(arc, cost);
        }
        solver.set_node_supply(0, 5);
        solver.set_node_supply(3, -5);
        solver
    };

    let mut first = build();
    let mut second = build();
    assert_eq!(first.solve(), Status::Optimal);
    assert_eq!(second.solve(), Status::Optimal);
    assert_eq!(first.optimal_cost(), second.optimal_cost());
    for arc in 0..first.num_arcs() {
        assert_eq!(first.flow(arc), second.flow(arc));
    }
}

#[test]
fn disabling_the_heuristics_changes_nothing_observable() {
    let mut reference = None;
    for (price_update, feasibility) in [(true, true), (false, true), (true, false), (false, false)] {
        let mut solver = SimpleMinCostFlow::new();
        for (tail, head, capacity, cost) in [(0usize, 1usize, 4i64, 2i64), (1, 2, 3, 1), (0, 2, 2, 4)] {
            let arc = solver.add_arc(tail, head);
            solver.set_arc_capacity(arc, capacity);
            solver.set_arc_unit_cost(arc, cost);
        }
        solver.set_node_supply(0, 3);
        solver.set_node_supply(2, -3);
        solver.set_use_price_update(price_update);
        solver.set_check_feasibility(feasibility);

        assert_eq!(solver.solve(), Status::Optimal);
        assert_valid_flow(&solver);
        let cost = solver.optimal_cost();
        match reference {
            None => reference = Some(cost),
            Some(expected) => assert_eq!(cost, expected),
        }
    }
}
