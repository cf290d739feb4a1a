pub mod config;
pub mod error;
pub mod feature;
pub mod session;
pub mod task;

pub use config::{AnalysisConfig, TaskCatalog};
pub use error::*;
pub use feature::*;
pub use session::*;
pub use task::*;
