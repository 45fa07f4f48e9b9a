mod mock;
mod orchestrator;
mod remote;

pub use mock::*;
pub use orchestrator::*;
pub use remote::*;
