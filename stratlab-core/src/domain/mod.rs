//! Domain types for the classification pipeline.

pub mod bar;
pub mod strat_type;
pub mod timeframe;

pub use bar::Bar;
pub use strat_type::{ParseStratTypeError, StratType};
pub use timeframe::{ParseTimeframeError, Timeframe};

/// Symbol type alias
pub type Symbol = String;
