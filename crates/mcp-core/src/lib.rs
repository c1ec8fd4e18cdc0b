pub mod protocol;
pub use protocol::{
    ErrorObject, Implementation, InitializeResult, JsonRpcRequest, JsonRpcResponse, RequestId,
};
pub mod tool;
pub use tool::{CallToolResult, Content, FailureOrigin, Tool, ToolCall, ToolFailure, ToolResult};
