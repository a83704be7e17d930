pub mod types;

pub use types::{PanelError, ReturnPanel, ReturnSeries};
