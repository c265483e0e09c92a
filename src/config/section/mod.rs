//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vellum.toml`:
//!
//! | Module    | TOML Section | Purpose                                  |
//! |-----------|--------------|------------------------------------------|
//! | `source`  | `[source]`   | Entry script                             |
//! | `runtime` | `[runtime]`  | Resource index, limits, sandbox reuse    |
//! | `output`  | `[output]`   | Output contract and artifact destination |
//! | `trigger` | `[trigger]`  | Debounce interval                        |
//! | `serve`   | `[serve]`    | Preview server                           |

mod output;
mod runtime;
mod serve;
mod source;
mod trigger;

pub use output::{ContractKind, OutputConfig};
pub use runtime::RuntimeConfig;
pub use serve::ServeConfig;
pub use source::SourceConfig;
pub use trigger::TriggerConfig;
