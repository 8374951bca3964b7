//! Build, lint and publish tasks for component libraries.
//!
//! Each task either shells out to a JavaScript tool through `npx` or does
//! plain file-system work. [`register_pipeline`] wires them into a
//! [`vctools_core::TaskGraph`].

pub mod bundle;
pub mod clean;
pub mod compile;
pub mod examples;
pub mod lint;
pub mod pipeline;
pub mod publish;
pub mod settings;

pub use pipeline::{description, register_pipeline, watch_patterns, TASKS};
pub use settings::Settings;
