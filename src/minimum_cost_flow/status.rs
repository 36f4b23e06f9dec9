#[derive(Default, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Status {
    #[default]
    NotSolved,
    Optimal,
    /// A flow exists but the solver stopped before proving optimality.
    /// Reserved; no code path currently returns it.
    Feasible,
    /// The feasibility check proved that the demands exceed what the network
    /// can route.
    Infeasible,
    /// The supplies do not sum to zero.
    Unbalanced,
    /// A post-solve invariant does not hold; internal error.
    BadResult,
    /// Scaling the costs by `num_nodes + 1` would overflow the flow type.
    BadCostRange,
}
