mod control_handle;
mod docs_handle;
mod sse_handle;

pub use control_handle::*;
pub use docs_handle::*;
pub use sse_handle::*;
