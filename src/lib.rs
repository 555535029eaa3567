//! Keeps Python-package formulas in step with the package index
//!
//! A formula is a Ruby-syntax build recipe whose primary `url` points at a
//! PyPI source tarball:
//!
//! ```ruby
//! class Httpie < Formula
//!   url "https://files.pythonhosted.org/packages/.../httpie-3.2.1.tar.gz"
//!   sha256 "..."
//!
//!   resource "requests" do
//!     url "https://files.pythonhosted.org/packages/.../requests-2.31.0.tar.gz"
//!     sha256 "..."
//!   end
//!
//!   def install
//!     virtualenv_install_with_resources
//!   end
//! end
//! ```
//!
//! # Pipeline
//!
//! 1. [`formula`] extracts the package name and declared version.
//! 2. [`index`] fetches the latest release from the PyPI JSON API.
//! 3. [`version`] decides whether it is newer.
//! 4. [`updates`] records the result as a JSON list of pending updates.
//! 5. [`deps`] installs the release into a throwaway venv to pin its
//!    runtime dependencies.
//! 6. [`mutate`] rewrites the url, checksum and resource blocks in place.
//!
//! [`pipeline::FormulaSync`] runs the whole thing per formula; the
//! `formula-sync` binary is a thin CLI over it.

mod core;

pub use crate::core::{
    config, deps, error, formula, fs_utils, index, mutate, output, pipeline, syntax, updates,
    version,
};
pub use crate::core::config::SyncConfig;
pub use crate::core::error::{FormulaError, IndexError, MutationError};
pub use crate::core::pipeline::{ApplyOptions, FormulaSync};
pub use crate::core::updates::PendingUpdate;
