//! Record services for PufferPanel.
//!
//! Services are cheap, per-request facades over the shared database handle.

pub mod nodes;

pub use nodes::NodeService;
