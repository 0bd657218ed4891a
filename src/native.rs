use std::ffi::{CStr, OsStr};
use std::os::raw::{c_char, c_float, c_int};

use libloading::Library;

use crate::config::{
    KiwiAnalyzeOption, KiwiBuilderHandle, KiwiHandle, KiwiPretokenizedHandle, KiwiResHandle,
    KiwiTypoHandle,
};
use crate::error::{KiwiError, Result};

pub(crate) type FnKiwiVersion = unsafe extern "C" fn() -> *const c_char;
pub(crate) type FnKiwiError = unsafe extern "C" fn() -> *const c_char;
pub(crate) type FnKiwiClearError = unsafe extern "C" fn();
pub(crate) type FnKiwiBuilderInit =
    unsafe extern "C" fn(*const c_char, c_int, c_int, c_int) -> KiwiBuilderHandle;
pub(crate) type FnKiwiBuilderAddWord =
    unsafe extern "C" fn(KiwiBuilderHandle, *const c_char, *const c_char, c_float) -> c_int;
pub(crate) type FnKiwiBuilderLoadDict =
    unsafe extern "C" fn(KiwiBuilderHandle, *const c_char) -> c_int;
pub(crate) type FnKiwiBuilderBuild =
    unsafe extern "C" fn(KiwiBuilderHandle, KiwiTypoHandle, c_float) -> KiwiHandle;
pub(crate) type FnKiwiBuilderClose = unsafe extern "C" fn(KiwiBuilderHandle) -> c_int;
pub(crate) type FnKiwiAnalyze = unsafe extern "C" fn(
    KiwiHandle,
    *const c_char,
    c_int,
    KiwiAnalyzeOption,
    KiwiPretokenizedHandle,
) -> KiwiResHandle;
pub(crate) type FnKiwiClose = unsafe extern "C" fn(KiwiHandle) -> c_int;
pub(crate) type FnKiwiResSize = unsafe extern "C" fn(KiwiResHandle) -> c_int;
pub(crate) type FnKiwiResWordNum = unsafe extern "C" fn(KiwiResHandle, c_int) -> c_int;
pub(crate) type FnKiwiResTag = unsafe extern "C" fn(KiwiResHandle, c_int, c_int) -> *const c_char;
pub(crate) type FnKiwiResForm =
    unsafe extern "C" fn(KiwiResHandle, c_int, c_int) -> *const c_char;
pub(crate) type FnKiwiResPosition = unsafe extern "C" fn(KiwiResHandle, c_int, c_int) -> c_int;
pub(crate) type FnKiwiResProb = unsafe extern "C" fn(KiwiResHandle, c_int) -> c_float;
pub(crate) type FnKiwiResClose = unsafe extern "C" fn(KiwiResHandle) -> c_int;

/// Resolved Kiwi C API entry points used by this crate.
#[derive(Clone, Copy)]
pub(crate) struct KiwiApi {
    pub(crate) kiwi_version: FnKiwiVersion,
    pub(crate) kiwi_error: FnKiwiError,
    pub(crate) kiwi_clear_error: FnKiwiClearError,
    pub(crate) kiwi_builder_init: FnKiwiBuilderInit,
    pub(crate) kiwi_builder_add_word: FnKiwiBuilderAddWord,
    pub(crate) kiwi_builder_load_dict: Option<FnKiwiBuilderLoadDict>,
    pub(crate) kiwi_builder_build: FnKiwiBuilderBuild,
    pub(crate) kiwi_builder_close: FnKiwiBuilderClose,
    pub(crate) kiwi_analyze: FnKiwiAnalyze,
    pub(crate) kiwi_close: FnKiwiClose,
    pub(crate) kiwi_res_size: FnKiwiResSize,
    pub(crate) kiwi_res_word_num: FnKiwiResWordNum,
    pub(crate) kiwi_res_tag: FnKiwiResTag,
    pub(crate) kiwi_res_form: FnKiwiResForm,
    pub(crate) kiwi_res_position: FnKiwiResPosition,
    pub(crate) kiwi_res_prob: FnKiwiResProb,
    pub(crate) kiwi_res_close: FnKiwiResClose,
}

impl KiwiApi {
    pub(crate) unsafe fn load(library: &Library) -> Result<Self> {
        Ok(Self {
            kiwi_version: load_symbol(library, "kiwi_version")?,
            kiwi_error: load_symbol(library, "kiwi_error")?,
            kiwi_clear_error: load_symbol(library, "kiwi_clear_error")?,
            kiwi_builder_init: load_symbol(library, "kiwi_builder_init")?,
            kiwi_builder_add_word: load_symbol(library, "kiwi_builder_add_word")?,
            kiwi_builder_load_dict: load_symbol_optional(library, "kiwi_builder_load_dict"),
            kiwi_builder_build: load_symbol(library, "kiwi_builder_build")?,
            kiwi_builder_close: load_symbol(library, "kiwi_builder_close")?,
            kiwi_analyze: load_symbol(library, "kiwi_analyze")?,
            kiwi_close: load_symbol(library, "kiwi_close")?,
            kiwi_res_size: load_symbol(library, "kiwi_res_size")?,
            kiwi_res_word_num: load_symbol(library, "kiwi_res_word_num")?,
            kiwi_res_tag: load_symbol(library, "kiwi_res_tag")?,
            kiwi_res_form: load_symbol(library, "kiwi_res_form")?,
            kiwi_res_position: load_symbol(library, "kiwi_res_position")?,
            kiwi_res_prob: load_symbol(library, "kiwi_res_prob")?,
            kiwi_res_close: load_symbol(library, "kiwi_res_close")?,
        })
    }
}

/// A function table together with the library that keeps its code mapped.
pub(crate) struct LoadedLibrary {
    // `None` only for in-process function tables used by tests.
    pub(crate) _library: Option<Library>,
    pub(crate) api: KiwiApi,
}

impl LoadedLibrary {
    pub(crate) fn open(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }.map_err(|error| {
            KiwiError::LibraryLoad(format!("{} ({error})", path.to_string_lossy()))
        })?;
        let api = unsafe { KiwiApi::load(&library)? };
        Ok(Self {
            _library: Some(library),
            api,
        })
    }
}

unsafe fn load_symbol<T: Copy>(library: &Library, symbol_name: &str) -> Result<T> {
    library
        .get::<T>(symbol_name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|error| KiwiError::SymbolLoad(format!("{symbol_name} ({error})")))
}

unsafe fn load_symbol_optional<T: Copy>(library: &Library, symbol_name: &str) -> Option<T> {
    library
        .get::<T>(symbol_name.as_bytes())
        .ok()
        .map(|symbol| *symbol)
}

pub(crate) fn clear_kiwi_error(api: &KiwiApi) {
    unsafe {
        (api.kiwi_clear_error)();
    }
}

pub(crate) fn read_kiwi_error(api: &KiwiApi) -> Option<String> {
    let message_ptr = unsafe { (api.kiwi_error)() };
    if message_ptr.is_null() {
        return None;
    }
    let message = unsafe { CStr::from_ptr(message_ptr) }
        .to_string_lossy()
        .trim()
        .to_string();
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

pub(crate) fn api_error(api: &KiwiApi, fallback: &str) -> KiwiError {
    match read_kiwi_error(api) {
        Some(message) => KiwiError::Api(message),
        None => KiwiError::Api(fallback.to_string()),
    }
}

/// Copies a native string into an owned `String`. Null becomes `None`.
pub(crate) fn cstr_to_string(pointer: *const c_char) -> Option<String> {
    if pointer.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(pointer) }
            .to_string_lossy()
            .into_owned(),
    )
}

pub(crate) fn require_optional_api<T: Copy>(function: Option<T>, name: &'static str) -> Result<T> {
    function.ok_or_else(|| {
        KiwiError::Api(format!(
            "{name} is unavailable in the loaded Kiwi library version"
        ))
    })
}
