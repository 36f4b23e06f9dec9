use flow_networks::minimum_cost_flow::simple::SimpleMinCostFlow;
use flow_networks::minimum_cost_flow::status::Status;

fn main() {
    let mut solver = SimpleMinCostFlow::new();

    let arcs = vec![
        solver.add_arc(0, 1),
        solver.add_arc(0, 2),
        solver.add_arc(1, 2),
        solver.add_arc(1, 3),
        solver.add_arc(2, 3),
    ];
    for (&arc, (capacity, cost)) in arcs.iter().zip([(2i64, 1i64), (1, 2), (1, 1), (1, 3), (2, 1)]) {
        solver.set_arc_capacity(arc, capacity);
        solver.set_arc_unit_cost(arc, cost);
    }

    solver.set_node_supply(0, 2);
    solver.set_node_supply(3, -2);

    match solver.solve() {
        Status::Optimal => {
            println!("minimum cost: {}", solver.optimal_cost().unwrap_or(0));
            for arc in arcs {
                println!("{} -> {}: flow {}/{}", solver.tail(arc), solver.head(arc), solver.flow(arc), solver.capacity(arc));
            }
        }
        status => println!("no optimal flow: {:?}", status),
    }
}
