pub mod common;
pub mod census;
pub mod order;

pub use common::{GraphView, NodeId};
pub use census::{motif_census, ego_census, neighbour_sums, neighbourhood, DyadKind, MotifProfile, MOTIF_LEN};
pub use order::{canonical, CANONICAL_NAMES, CANONICAL_ORDER};
