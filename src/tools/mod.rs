// Tool execution system
//
// Lets the model run a fixed set of local tools through a name-keyed
// registry; every risky action goes through the confirmation gate first.

pub mod implementations;
pub mod process;
pub mod registry;
pub mod types;

pub use registry::{Tool, ToolRegistry};
pub use types::{ToolDefinition, ToolInputSchema, ToolResult};
