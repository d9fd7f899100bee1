//! Terminal UI helpers for renutil.
//!
//! Consistent output formatting, spinners, progress bars, and error
//! display for the renutil CLI.

pub mod output;
pub mod spinner;
pub mod style;

pub use output::{Output, Verbosity};
pub use spinner::{Progress, Spinner};
pub use style::Style;
