pub mod analysis;
pub mod api_observability;
pub mod app_config;
pub mod generation;

pub use analysis::*;
pub use api_observability::*;
pub use app_config::*;
pub use generation::*;
