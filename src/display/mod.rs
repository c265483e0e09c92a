//! Display surface model shared by the terminal and HTTP previews.
//!
//! - `state` - what is shown (`DisplayState`) and published frames
//! - `route` - pure mapping from execution results, stale-result filter
//! - `viewer` - page navigation and zoom over an artifact

mod route;
mod state;
mod viewer;

pub use route::{Router, format_failure};
pub use state::{DisplayState, Frame};
pub use viewer::{ArtifactViewer, count_pages};
