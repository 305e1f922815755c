mod context;
mod native;

pub use context::{WgpuBuffer, WgpuContext, WgpuProgram};
pub use native::Renderer;
