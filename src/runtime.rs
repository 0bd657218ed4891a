use std::env;
use std::ffi::{CStr, CString};
use std::os::raw::{c_float, c_int, c_void};
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::KiwiAnalyzeOption;
use crate::discovery::{default_library_candidates, discover_default_library_path};
use crate::error::{KiwiError, Result};
use crate::native::{api_error, clear_kiwi_error, require_optional_api, KiwiApi, LoadedLibrary};
use crate::options::{AnalyzeOption, BuildOption, Dialect};
use crate::pos::PosType;
use crate::result::AnalyzeResult;
use crate::types::{
    AnalyzeOptions, BuilderConfig, KiwiConfig, Status, TokenInfo, TokenResult, UserWord,
};
use crate::version::VersionInfo;

// The engine's model construction path is not re-entrant across instances.
static KIWI_INIT_LOCK: Mutex<()> = Mutex::new(());

/// Handle to a loaded Kiwi dynamic library plus resolved function table.
///
/// Cloning is cheap; every builder and analyzer keeps the library mapped
/// for as long as it lives.
#[derive(Clone)]
pub struct KiwiLibrary {
    inner: Arc<LoadedLibrary>,
}

impl KiwiLibrary {
    /// Loads a Kiwi dynamic library from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let loaded = LoadedLibrary::open(path.as_ref())?;
        log::debug!("loaded kiwi library from {}", path.as_ref().display());
        Ok(Self {
            inner: Arc::new(loaded),
        })
    }

    /// Loads Kiwi from common platform-specific locations and caches it.
    pub fn load_default() -> Result<Self> {
        static DEFAULT_LIBRARY: Mutex<Option<Arc<LoadedLibrary>>> = Mutex::new(None);

        let mut guard = DEFAULT_LIBRARY.lock().map_err(|_| {
            KiwiError::LibraryLoad("failed to lock default library cache".to_string())
        })?;

        if let Some(inner) = guard.as_ref() {
            return Ok(Self {
                inner: inner.clone(),
            });
        }

        let loaded = Self::load_default_uncached()?;
        *guard = Some(loaded.inner.clone());
        Ok(loaded)
    }

    fn load_default_uncached() -> Result<Self> {
        let mut errors = Vec::new();

        let discovered = discover_default_library_path();
        let candidates = discovered.into_iter().chain(
            default_library_candidates()
                .iter()
                .map(|candidate| PathBuf::from(*candidate)),
        );

        for candidate in candidates {
            match Self::load(&candidate) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{}: {error}", candidate.display())),
            }
        }

        Err(KiwiError::LibraryLoad(format!(
            "set KIWI_LIBRARY_PATH to the dynamic library path. tried: {}",
            errors.join(" | ")
        )))
    }

    /// Loads from `KIWI_LIBRARY_PATH` if set, otherwise falls back to
    /// [`Self::load_default`].
    pub fn load_from_env_or_default() -> Result<Self> {
        if let Some(path) = env::var_os("KIWI_LIBRARY_PATH") {
            return Self::load(PathBuf::from(path));
        }
        Self::load_default()
    }

    #[cfg(test)]
    pub(crate) fn from_api(api: KiwiApi) -> Self {
        Self {
            inner: Arc::new(LoadedLibrary {
                _library: None,
                api,
            }),
        }
    }

    fn api(&self) -> &KiwiApi {
        &self.inner.api
    }

    /// Returns the loaded Kiwi library version string.
    pub fn version(&self) -> Result<String> {
        let pointer = unsafe { (self.api().kiwi_version)() };
        if pointer.is_null() {
            return Err(api_error(self.api(), "kiwi_version returned a null pointer"));
        }
        Ok(unsafe { CStr::from_ptr(pointer) }
            .to_string_lossy()
            .into_owned())
    }

    /// Queries the version and measures how long the query took.
    pub fn version_info(&self) -> Result<VersionInfo> {
        let start = Instant::now();
        let version = self.version()?;
        Ok(VersionInfo {
            version,
            elapsed: start.elapsed(),
        })
    }

    /// Creates a [`KiwiBuilder`] with the provided configuration.
    ///
    /// A model path the engine cannot load is reported here, so a builder
    /// value always holds a usable handle until it is built or closed.
    pub fn builder(&self, config: BuilderConfig) -> Result<KiwiBuilder> {
        let model_path = config
            .model_path
            .as_ref()
            .map(|path| CString::new(path.to_string_lossy().into_owned()))
            .transpose()?;
        let model_path_ptr = model_path
            .as_ref()
            .map_or(ptr::null(), |value| value.as_ptr());

        clear_kiwi_error(self.api());
        let handle = unsafe {
            (self.api().kiwi_builder_init)(
                model_path_ptr,
                config.num_threads as c_int,
                config.build_options.bits(),
                config.enabled_dialects.bits(),
            )
        };

        let handle = NonNull::new(handle).ok_or_else(|| {
            api_error(self.api(), "kiwi_builder_init returned a null handle")
        })?;
        log::debug!(
            "kiwi builder initialized (model={:?}, threads={}, options={:?})",
            config.model_path,
            config.num_threads,
            config.build_options
        );

        Ok(KiwiBuilder {
            inner: self.inner.clone(),
            handle: Some(handle),
            num_threads: config.num_threads,
            build_options: config.build_options,
            typo_cost_threshold: config.typo_cost_threshold,
        })
    }
}

/// Staged construction of a [`Kiwi`] analyzer.
///
/// Register custom vocabulary, then call [`KiwiBuilder::build`]. Building
/// consumes the builder and always releases its native state.
pub struct KiwiBuilder {
    inner: Arc<LoadedLibrary>,
    handle: Option<NonNull<c_void>>,
    num_threads: i32,
    build_options: BuildOption,
    typo_cost_threshold: f32,
}

impl KiwiBuilder {
    /// Shorthand for [`KiwiLibrary::builder`] with standard dialects and no
    /// typo threshold.
    ///
    /// # Examples
    /// ```no_run
    /// use kiwi_binder::{AnalyzeOption, BuildOption, KiwiBuilder, KiwiLibrary, PosType};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let library = KiwiLibrary::load_from_env_or_default()?;
    /// let mut builder =
    ///     KiwiBuilder::new(&library, "./models/base", 1, BuildOption::INTEGRATE_ALLOMORPH)?;
    /// builder.add_word("코딩냄비", PosType::Nnp, 0.0)?;
    ///
    /// let kiwi = builder.build()?;
    /// let results = kiwi.analyze("안녕하세요 코딩냄비입니다.", 1, AnalyzeOption::ALL)?;
    /// println!("{results:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        library: &KiwiLibrary,
        model_path: impl AsRef<Path>,
        num_threads: i32,
        build_options: BuildOption,
    ) -> Result<Self> {
        library.builder(BuilderConfig {
            model_path: Some(model_path.as_ref().to_path_buf()),
            num_threads,
            build_options,
            enabled_dialects: Dialect::STANDARD,
            typo_cost_threshold: 0.0,
        })
    }

    fn live_handle(&self) -> Result<*mut c_void> {
        self.handle
            .map(NonNull::as_ptr)
            .ok_or(KiwiError::Closed("builder"))
    }

    /// Registers one custom vocabulary entry.
    ///
    /// The native status is returned as a value; a negative status leaves the
    /// builder usable.
    pub fn add_word(&mut self, word: &str, pos: PosType, score: f32) -> Result<Status> {
        let handle = self.live_handle()?;
        let word_c = CString::new(word)?;
        let tag_c = CString::new(pos.as_str())?;

        clear_kiwi_error(&self.inner.api);
        let status = Status::from(unsafe {
            (self.inner.api.kiwi_builder_add_word)(
                handle,
                word_c.as_ptr(),
                tag_c.as_ptr(),
                score as c_float,
            )
        });
        if !status.is_ok() {
            log::debug!("kiwi_builder_add_word({word}/{pos}) returned {status:?}");
        }
        Ok(status)
    }

    /// Registers several entries, collecting one status per word.
    pub fn add_words<I>(&mut self, words: I) -> Result<Vec<Status>>
    where
        I: IntoIterator<Item = UserWord>,
    {
        words
            .into_iter()
            .map(|word| self.add_word(&word.word, word.tag, word.score))
            .collect()
    }

    /// Merges a user dictionary file.
    ///
    /// On success the status code is the number of inserted entries.
    pub fn load_dict(&mut self, dict_path: impl AsRef<Path>) -> Result<Status> {
        let handle = self.live_handle()?;
        let load_dict = require_optional_api(
            self.inner.api.kiwi_builder_load_dict,
            "kiwi_builder_load_dict",
        )?;
        let dict_path_c = CString::new(dict_path.as_ref().to_string_lossy().into_owned())?;

        clear_kiwi_error(&self.inner.api);
        let status = Status::from(unsafe { load_dict(handle, dict_path_c.as_ptr()) });
        log::debug!(
            "kiwi_builder_load_dict({}) returned {status:?}",
            dict_path.as_ref().display()
        );
        Ok(status)
    }

    /// Finalizes the configuration into an analyzer.
    ///
    /// The builder's native state is released exactly once here, whether or
    /// not the build succeeds.
    pub fn build(mut self) -> Result<Kiwi> {
        let handle = self.live_handle()?;

        clear_kiwi_error(&self.inner.api);
        let built = {
            let _guard = KIWI_INIT_LOCK
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            unsafe {
                (self.inner.api.kiwi_builder_build)(
                    handle,
                    ptr::null_mut(),
                    self.typo_cost_threshold as c_float,
                )
            }
        };
        let built = NonNull::new(built)
            .ok_or_else(|| api_error(&self.inner.api, "kiwi_builder_build returned a null handle"));

        let status = self.close();
        if !status.is_ok() {
            log::warn!("kiwi_builder_close after build returned {status:?}");
        }

        let handle = built?;
        log::debug!("kiwi analyzer built");
        Ok(Kiwi {
            inner: self.inner.clone(),
            handle: Some(handle),
            num_threads: self.num_threads,
            build_options: self.build_options,
            default_analyze_options: AnalyzeOptions::default(),
        })
    }

    /// Releases the native builder state.
    ///
    /// Calling it again is a no-op returning [`Status::OK`].
    pub fn close(&mut self) -> Status {
        let Some(handle) = self.handle.take() else {
            return Status::OK;
        };
        log::debug!("closing kiwi builder");
        Status::from(unsafe { (self.inner.api.kiwi_builder_close)(handle.as_ptr()) })
    }

    /// Returns `true` once the native state has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for KiwiBuilder {
    fn drop(&mut self) {
        let status = self.close();
        if !status.is_ok() {
            log::warn!("kiwi_builder_close returned {status:?} while dropping builder");
        }
    }
}

/// Built analyzer holding a live engine handle.
pub struct Kiwi {
    inner: Arc<LoadedLibrary>,
    handle: Option<NonNull<c_void>>,
    num_threads: i32,
    build_options: BuildOption,
    default_analyze_options: AnalyzeOptions,
}

impl Kiwi {
    /// Creates an analyzer using [`KiwiConfig::default`].
    pub fn new() -> Result<Self> {
        Self::from_config(KiwiConfig::default())
    }

    /// Shorthand for setting only `model_path`.
    pub fn with_model_path(model_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(KiwiConfig::default().with_model_path(model_path))
    }

    /// Loads the library, applies user words and builds in one step.
    ///
    /// # Examples
    /// ```no_run
    /// use kiwi_binder::{Kiwi, KiwiConfig, PosType};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = KiwiConfig::default()
    ///     .with_library_path("/path/to/libkiwi.so")
    ///     .with_model_path("/path/to/models/cong/base")
    ///     .add_user_word("러스트", PosType::Nnp, 0.0);
    /// let kiwi = Kiwi::from_config(config)?;
    /// let _ = kiwi.tokenize("러스트 형태소 분석")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: KiwiConfig) -> Result<Self> {
        let library = match config.library_path {
            Some(path) => KiwiLibrary::load(path)?,
            None => KiwiLibrary::load_from_env_or_default()?,
        };

        let version = library.version_info()?;
        if version.is_newer_than_tag_set() {
            log::warn!(
                "kiwi {} is newer than the tag table; unseen tags will fail to decode",
                version.version
            );
        }

        let mut builder = library.builder(config.builder)?;
        for word in config.user_words {
            builder
                .add_word(&word.word, word.tag, word.score)?
                .into_result("kiwi_builder_add_word")?;
        }

        let mut kiwi = builder.build()?;
        kiwi.default_analyze_options = config.default_analyze_options;
        Ok(kiwi)
    }

    fn live_handle(&self) -> Result<*mut c_void> {
        self.handle
            .map(NonNull::as_ptr)
            .ok_or(KiwiError::Closed("analyzer"))
    }

    /// Worker threads requested when the builder was created.
    pub fn num_threads(&self) -> i32 {
        self.num_threads
    }

    /// Build options the analyzer was created with.
    pub fn build_options(&self) -> BuildOption {
        self.build_options
    }

    /// Options used by [`Self::tokenize`].
    pub fn default_analyze_options(&self) -> AnalyzeOptions {
        self.default_analyze_options
    }

    /// Replaces the options used by [`Self::tokenize`].
    pub fn set_default_analyze_options(&mut self, options: AnalyzeOptions) {
        self.default_analyze_options = options;
    }

    /// Analyzes `text`, returning up to `top_n` candidates in the order the
    /// engine ranked them.
    ///
    /// Positions are character offsets. If any morpheme carries a tag outside
    /// [`PosType`], the whole call fails with [`KiwiError::UnknownTag`].
    pub fn analyze(
        &self,
        text: &str,
        top_n: usize,
        options: AnalyzeOption,
    ) -> Result<Vec<TokenResult>> {
        self.analyze_with_options(
            text,
            AnalyzeOptions::default()
                .with_top_n(top_n)
                .with_match_options(options),
        )
    }

    /// Analyzes text with fully explicit options.
    pub fn analyze_with_options(
        &self,
        text: &str,
        options: AnalyzeOptions,
    ) -> Result<Vec<TokenResult>> {
        let handle = self.live_handle()?;
        let top_n = options.validated_top_n()?;
        let text_c = CString::new(text)?;

        let analyze_option = KiwiAnalyzeOption {
            match_options: options.match_options.bits(),
            blocklist: ptr::null_mut(),
            open_ending: c_int::from(options.open_ending),
            allowed_dialects: options.allowed_dialects.bits(),
            dialect_cost: options.dialect_cost as c_float,
        };

        clear_kiwi_error(&self.inner.api);
        let result_handle = unsafe {
            (self.inner.api.kiwi_analyze)(
                handle,
                text_c.as_ptr(),
                top_n,
                analyze_option,
                ptr::null_mut(),
            )
        };
        let result_handle = NonNull::new(result_handle)
            .ok_or_else(|| api_error(&self.inner.api, "kiwi_analyze returned a null handle"))?;

        AnalyzeResult::new(self.inner.clone(), result_handle).decode()
    }

    /// Tokens of the best candidate under the default analyze options.
    pub fn tokenize(&self, text: &str) -> Result<Vec<TokenInfo>> {
        let options = self.default_analyze_options.with_top_n(1);
        Ok(self
            .analyze_with_options(text, options)?
            .into_iter()
            .next()
            .map(|best| best.tokens)
            .unwrap_or_default())
    }

    /// Releases the native engine.
    ///
    /// Calling it again is a no-op returning [`Status::OK`].
    pub fn close(&mut self) -> Status {
        let Some(handle) = self.handle.take() else {
            return Status::OK;
        };
        log::debug!("closing kiwi analyzer");
        Status::from(unsafe { (self.inner.api.kiwi_close)(handle.as_ptr()) })
    }

    /// Returns `true` once the native engine has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for Kiwi {
    fn drop(&mut self) {
        let status = self.close();
        if !status.is_ok() {
            log::warn!("kiwi_close returned {status:?} while dropping analyzer");
        }
    }
}
