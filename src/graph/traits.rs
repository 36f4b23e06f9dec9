/// Contract between the flow solvers and the underlying graph representation.
///
/// Every input arc `e` owns a pair of directed arcs: the forward arc `2 * e`
/// and its reverse partner `2 * e + 1`, so internal arc ids range over
/// `0..2 * num_arcs()` and [`opposite`](ReverseArcGraph::opposite) is an O(1)
/// involution. The topology is fixed after construction; solvers only read it.
pub trait ReverseArcGraph {
    fn num_nodes(&self) -> usize;

    /// Number of forward arcs.
    fn num_arcs(&self) -> usize;

    fn head(&self, arc: usize) -> usize;

    #[inline]
    fn tail(&self, arc: usize) -> usize {
        self.head(self.opposite(arc))
    }

    /// The paired arc with tail and head swapped.
    #[inline]
    fn opposite(&self, arc: usize) -> usize {
        arc ^ 1
    }

    /// Internal id of the forward arc of input arc `edge`.
    #[inline]
    fn forward_arc(&self, edge: usize) -> usize {
        2 * edge
    }

    #[inline]
    fn is_forward(&self, arc: usize) -> bool {
        arc & 1 == 0
    }

    /// Every arc whose tail is `node`, forward and reverse incidences alike,
    /// in a stable order.
    fn incident_arcs(&self, node: usize) -> &[usize];
}
