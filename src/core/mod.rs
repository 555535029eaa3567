//! Formula synchronization components
//!
//! One module per stage of the pipeline, plus the shared pieces they need.

pub mod config;
pub mod deps;
pub mod error;
pub mod formula;
pub mod fs_utils;
pub mod index;
pub mod mutate;
pub mod output;
pub mod pipeline;
pub mod syntax;
pub mod updates;
pub mod version;
