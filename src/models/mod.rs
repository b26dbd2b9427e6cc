pub mod node;
pub mod status;

pub use node::{NewNode, NodeRecord, NodeState, NodeUpdate};
pub use status::NodeStatusReport;
