pub mod node_status;
pub mod registry;
pub mod sync;

pub use node_status::NodeStatusAggregator;
pub use registry::NodeRegistry;
pub use sync::{sync_node, SyncOutcome};
