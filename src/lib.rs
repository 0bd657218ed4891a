//! Rust bindings for the Kiwi morphological analyzer C API.
//!
//! The native library is loaded at runtime, so nothing links against Kiwi at
//! build time. Analysis goes through two stages: a [`KiwiBuilder`] collects
//! model settings and user vocabulary, then [`KiwiBuilder::build`] turns it
//! into a [`Kiwi`] analyzer.
//!
//! ## Quick Start
//! ```no_run
//! use kiwi_binder::{AnalyzeOption, BuildOption, KiwiBuilder, KiwiLibrary, PosType};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let library = KiwiLibrary::load_from_env_or_default()?;
//!     let mut builder =
//!         KiwiBuilder::new(&library, "./models/base", 1, BuildOption::INTEGRATE_ALLOMORPH)?;
//!     builder.add_word("코딩냄비", PosType::Nnp, 0.0)?;
//!
//!     let kiwi = builder.build()?;
//!     for candidate in kiwi.analyze("안녕하세요 코딩냄비입니다.", 1, AnalyzeOption::ALL)? {
//!         for token in &candidate.tokens {
//!             println!("{} {}/{}", token.position, token.form, token.tag);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Offset Rules
//! Token positions are character indices (based on `str::chars`), not byte
//! indices.
//!
//! ## Environment Variables
//! - `KIWI_LIBRARY_PATH`: explicit dynamic library path.
//! - `KIWI_MODEL_PATH`: explicit model directory path.
//!
//! ## Threading
//! [`KiwiBuilder`] and [`Kiwi`] wrap raw native handles and are neither `Send`
//! nor `Sync`. Create one analyzer per thread when analyzing in parallel.

mod config;
mod discovery;
mod error;
mod native;
mod options;
mod pos;
mod result;
mod runtime;
mod types;
mod version;

#[cfg(test)]
mod test_support;

pub use error::{KiwiError, Result};
pub use options::{AnalyzeOption, BuildOption, Dialect, ModelType};
pub use pos::{PosType, TAG_SET_VERSION};
pub use runtime::{Kiwi, KiwiBuilder, KiwiLibrary};
pub use types::{
    AnalyzeOptions, BuilderConfig, KiwiConfig, Status, TokenInfo, TokenResult, UserWord,
};
pub use version::VersionInfo;

/// Alias for [`KiwiBuilder`].
pub type Builder = KiwiBuilder;
/// Alias for [`Kiwi`].
pub type Analyzer = Kiwi;
