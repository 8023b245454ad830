mod dispatcher;
mod interface;
mod registry;

pub use dispatcher::{ToolDispatcher, ToolErrorKind, ToolInvocationResult};
pub use interface::{ParamKind, ParamSpec, Tool, ToolFailure, decode_params};
pub use registry::{RegistryError, ToolDescriptor, ToolRegistry};
