use std::env;
use std::fmt;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

use crate::discovery::discover_default_model_path;
use crate::error::{KiwiError, Result};
use crate::options::{AnalyzeOption, BuildOption, Dialect};
use crate::pos::PosType;

/// One morpheme of an analysis candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    /// Zero-based character offset (`str::chars` index) in the analyzed text.
    pub position: usize,
    /// Part-of-speech tag.
    pub tag: PosType,
    /// Surface form.
    pub form: String,
}

/// One ranked candidate analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResult {
    /// Morphemes in left-to-right order.
    pub tokens: Vec<TokenInfo>,
    /// Log-likelihood style score; higher is better.
    pub score: f32,
}

/// Raw status returned by native configuration calls.
///
/// Non-negative values are success (`kiwi_builder_load_dict` reports the
/// number of inserted entries); negative values are recoverable failures.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(c_int);

impl Status {
    /// Success, also returned when closing an already released handle.
    pub const OK: Status = Status(0);

    /// Raw native value.
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` for a non-negative status.
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    /// Converts a failing status into [`KiwiError::Status`].
    pub fn into_result(self, operation: &'static str) -> Result<i32> {
        if self.is_ok() {
            Ok(self.0)
        } else {
            Err(KiwiError::Status {
                operation,
                code: self.0,
            })
        }
    }
}

impl From<c_int> for Status {
    fn from(code: c_int) -> Self {
        Status(code)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({})", self.0)
    }
}

/// User dictionary entry applied before building.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWord {
    /// Surface form.
    pub word: String,
    /// Tag assigned to the form.
    pub tag: PosType,
    /// Log-likelihood bias; higher values make the entry win ambiguities.
    pub score: f32,
}

impl UserWord {
    /// Creates a new entry.
    pub fn new(word: impl Into<String>, tag: PosType, score: f32) -> Self {
        Self {
            word: word.into(),
            tag,
            score,
        }
    }
}

/// Per-call analysis settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzeOptions {
    /// Maximum number of candidates to return. Must be at least 1.
    pub top_n: usize,
    /// Pattern matching and normalization flags.
    pub match_options: AnalyzeOption,
    /// Allow the analysis to end in the middle of a word.
    pub open_ending: bool,
    /// Dialects the analysis may produce.
    pub allowed_dialects: Dialect,
    /// Penalty applied to dialect morphemes.
    pub dialect_cost: f32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            top_n: 1,
            match_options: AnalyzeOption::ALL_WITH_NORMALIZING,
            open_ending: false,
            allowed_dialects: Dialect::STANDARD,
            dialect_cost: 3.0,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_match_options(mut self, match_options: AnalyzeOption) -> Self {
        self.match_options = match_options;
        self
    }

    pub fn with_open_ending(mut self, open_ending: bool) -> Self {
        self.open_ending = open_ending;
        self
    }

    pub fn with_allowed_dialects(mut self, allowed_dialects: Dialect) -> Self {
        self.allowed_dialects = allowed_dialects;
        self
    }

    pub fn with_dialect_cost(mut self, dialect_cost: f32) -> Self {
        self.dialect_cost = dialect_cost;
        self
    }

    pub(crate) fn validated_top_n(&self) -> Result<c_int> {
        if self.top_n == 0 {
            return Err(KiwiError::InvalidArgument(
                "AnalyzeOptions.top_n must be >= 1".to_string(),
            ));
        }
        c_int::try_from(self.top_n).map_err(|_| {
            KiwiError::InvalidArgument(format!("AnalyzeOptions.top_n must be <= {}", c_int::MAX))
        })
    }
}

/// Settings for `kiwi_builder_init` and `kiwi_builder_build`.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Model directory. `None` lets the engine use its built-in lookup.
    pub model_path: Option<PathBuf>,
    /// Worker threads for the engine's own pool (`-1` = all cores).
    pub num_threads: i32,
    /// Build flags and model type.
    pub build_options: BuildOption,
    /// Dialects loaded into the model.
    pub enabled_dialects: Dialect,
    /// Typo cost threshold forwarded to `kiwi_builder_build`.
    pub typo_cost_threshold: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            model_path: discover_default_model_path(),
            num_threads: -1,
            build_options: BuildOption::DEFAULT,
            enabled_dialects: Dialect::STANDARD,
            typo_cost_threshold: 0.0,
        }
    }
}

impl BuilderConfig {
    pub fn with_model_path(mut self, model_path: impl AsRef<Path>) -> Self {
        self.model_path = Some(model_path.as_ref().to_path_buf());
        self
    }

    pub fn with_num_threads(mut self, num_threads: i32) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_build_options(mut self, build_options: BuildOption) -> Self {
        self.build_options = build_options;
        self
    }

    pub fn with_enabled_dialects(mut self, enabled_dialects: Dialect) -> Self {
        self.enabled_dialects = enabled_dialects;
        self
    }

    pub fn with_typo_cost_threshold(mut self, typo_cost_threshold: f32) -> Self {
        self.typo_cost_threshold = typo_cost_threshold;
        self
    }
}

/// Everything needed to go from a library path to a ready analyzer.
#[derive(Debug, Clone)]
pub struct KiwiConfig {
    /// Dynamic library path; defaults to `KIWI_LIBRARY_PATH`.
    pub library_path: Option<PathBuf>,
    /// Builder settings.
    pub builder: BuilderConfig,
    /// Options used by [`crate::Kiwi::tokenize`].
    pub default_analyze_options: AnalyzeOptions,
    /// Words registered before building.
    pub user_words: Vec<UserWord>,
}

impl Default for KiwiConfig {
    fn default() -> Self {
        Self {
            library_path: env::var_os("KIWI_LIBRARY_PATH").map(PathBuf::from),
            builder: BuilderConfig::default(),
            default_analyze_options: AnalyzeOptions::default(),
            user_words: Vec::new(),
        }
    }
}

impl KiwiConfig {
    pub fn with_library_path(mut self, library_path: impl AsRef<Path>) -> Self {
        self.library_path = Some(library_path.as_ref().to_path_buf());
        self
    }

    pub fn with_model_path(mut self, model_path: impl AsRef<Path>) -> Self {
        self.builder = self.builder.with_model_path(model_path);
        self
    }

    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_default_analyze_options(mut self, options: AnalyzeOptions) -> Self {
        self.default_analyze_options = options;
        self
    }

    pub fn add_user_word(mut self, word: impl Into<String>, tag: PosType, score: f32) -> Self {
        self.user_words.push(UserWord::new(word, tag, score));
        self
    }
}
