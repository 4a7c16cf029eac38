mod activation;
mod license;
mod listing;
mod plan;
mod stats;

pub use activation::*;
pub use license::*;
pub use listing::*;
pub use plan::*;
pub use stats::*;
