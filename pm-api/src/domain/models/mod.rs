mod architect;
mod bundle;
mod contact;
mod contractor;
mod project;

pub use architect::*;
pub use bundle::*;
pub use contact::*;
pub use contractor::*;
pub use project::*;
