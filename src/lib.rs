//! Network flow algorithms built around a minimum-cost flow solver based on
//! the Goldberg-Tarjan cost-scaling push-relabel algorithm.
//!
//! The solver runs on a static forward-star graph with a reserved reverse arc
//! for every forward arc ([`graph::static_graph::StaticGraph`]), and uses a
//! max-flow pass ([`maximum_flow::dinic::GenericMaxFlow`]) to certify that the
//! supplies can reach the demands before optimization starts.
//!
//! Most callers want [`minimum_cost_flow::simple::SimpleMinCostFlow`].

pub mod graph;
pub mod maximum_flow;
pub mod minimum_cost_flow;
