use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::env;
use std::ffi::{CStr, CString, OsString};
use std::fs;
use std::os::raw::{c_char, c_float, c_int, c_void};
use std::ptr;
use std::sync::{Mutex, OnceLock};

use crate::config::KiwiAnalyzeOption;
use crate::native::KiwiApi;
use crate::runtime::KiwiLibrary;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn set_env_var(key: &str, value: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env_var(key: &str) {
    #[allow(unused_unsafe)]
    unsafe {
        env::remove_var(key);
    }
}

/// Runs a closure with one overridden environment variable.
pub(crate) fn with_env_var<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
    with_env_vars(&[(key, Some(value))], f)
}

/// Runs a closure while holding a global environment lock and applying overrides.
pub(crate) fn with_env_vars<T>(overrides: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let backups: Vec<(&str, Option<OsString>)> = overrides
        .iter()
        .map(|(key, _)| (*key, env::var_os(key)))
        .collect();

    for (key, value) in overrides {
        match value {
            Some(value) => set_env_var(key, value),
            None => remove_env_var(key),
        }
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in backups.into_iter().rev() {
        match value {
            Some(value) => {
                #[allow(unused_unsafe)]
                unsafe {
                    env::set_var(key, value);
                }
            }
            None => remove_env_var(key),
        }
    }

    match result {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

// In-process stand-in for the native engine.
//
// Model paths containing "missing" fail at `kiwi_builder_init`, paths
// containing "unbuildable" fail at `kiwi_builder_build`. Analysis splits on
// whitespace, tags registered words with their registered tag, all-punctuation
// chunks with SF, the chunk "#bad" with an unknown tag and everything else with
// NNG. At most two candidates are produced, the worse-scoring one first.

pub(crate) const FAKE_VERSION: &str = "0.22.2";
pub(crate) const FIRST_CANDIDATE_SCORE: f32 = -12.5;
pub(crate) const SECOND_CANDIDATE_SCORE: f32 = -7.25;

/// Native calls observed on the current test thread.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FakeCounters {
    pub(crate) builders_opened: usize,
    pub(crate) builders_closed: usize,
    pub(crate) analyzers_opened: usize,
    pub(crate) analyzers_closed: usize,
    pub(crate) results_opened: usize,
    pub(crate) results_closed: usize,
    pub(crate) last_init_threads: Option<c_int>,
    pub(crate) last_init_options: Option<c_int>,
    pub(crate) last_init_dialects: Option<c_int>,
    pub(crate) last_typo_threshold: Option<f32>,
    pub(crate) last_top_n: Option<c_int>,
    pub(crate) last_match_options: Option<c_int>,
    pub(crate) last_open_ending: Option<c_int>,
    pub(crate) last_allowed_dialects: Option<c_int>,
    pub(crate) last_dialect_cost: Option<f32>,
}

thread_local! {
    static COUNTERS: Cell<FakeCounters> = Cell::new(FakeCounters::default());
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn counters() -> FakeCounters {
    COUNTERS.with(Cell::get)
}

fn record(update: impl FnOnce(&mut FakeCounters)) {
    COUNTERS.with(|cell| {
        let mut counters = cell.get();
        update(&mut counters);
        cell.set(counters);
    });
}

fn set_error(message: &str) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = CString::new(message).ok();
    });
}

unsafe fn read_c_str(pointer: *const c_char) -> String {
    if pointer.is_null() {
        return String::new();
    }
    CStr::from_ptr(pointer).to_string_lossy().into_owned()
}

struct FakeBuilder {
    words: Vec<(String, String)>,
    unbuildable: bool,
}

struct FakeKiwi {
    words: HashMap<String, String>,
}

struct FakeToken {
    position: c_int,
    tag: CString,
    form: CString,
}

struct FakeResult {
    candidates: Vec<(Vec<FakeToken>, f32)>,
}

unsafe extern "C" fn fake_version() -> *const c_char {
    b"0.22.2\0".as_ptr().cast()
}

unsafe extern "C" fn fake_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |message| message.as_ptr())
    })
}

unsafe extern "C" fn fake_clear_error() {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = None;
    });
}

unsafe extern "C" fn fake_builder_init(
    model_path: *const c_char,
    num_threads: c_int,
    options: c_int,
    enabled_dialects: c_int,
) -> *mut c_void {
    record(|counters| {
        counters.last_init_threads = Some(num_threads);
        counters.last_init_options = Some(options);
        counters.last_init_dialects = Some(enabled_dialects);
    });

    let model_path = read_c_str(model_path);
    if model_path.contains("missing") {
        set_error(&format!("cannot open model at '{model_path}'"));
        return ptr::null_mut();
    }

    record(|counters| counters.builders_opened += 1);
    Box::into_raw(Box::new(FakeBuilder {
        words: Vec::new(),
        unbuildable: model_path.contains("unbuildable"),
    }))
    .cast()
}

unsafe extern "C" fn fake_builder_add_word(
    handle: *mut c_void,
    word: *const c_char,
    tag: *const c_char,
    _score: c_float,
) -> c_int {
    let builder = &mut *handle.cast::<FakeBuilder>();
    let word = read_c_str(word);
    if builder.words.iter().any(|(known, _)| *known == word) {
        set_error(&format!("'{word}' is already registered"));
        return -1;
    }
    builder.words.push((word, read_c_str(tag)));
    0
}

unsafe extern "C" fn fake_builder_load_dict(handle: *mut c_void, path: *const c_char) -> c_int {
    let builder = &mut *handle.cast::<FakeBuilder>();
    let path = read_c_str(path);
    let Ok(contents) = fs::read_to_string(&path) else {
        set_error(&format!("cannot open dictionary '{path}'"));
        return -1;
    };

    let mut inserted = 0;
    for line in contents.lines() {
        let mut fields = line.split('\t');
        if let (Some(word), Some(tag)) = (fields.next(), fields.next()) {
            builder.words.push((word.to_string(), tag.to_string()));
            inserted += 1;
        }
    }
    inserted
}

unsafe extern "C" fn fake_builder_build(
    handle: *mut c_void,
    _typos: *mut c_void,
    typo_cost_threshold: c_float,
) -> *mut c_void {
    record(|counters| counters.last_typo_threshold = Some(typo_cost_threshold));
    let builder = &*handle.cast::<FakeBuilder>();
    if builder.unbuildable {
        set_error("model data is corrupted");
        return ptr::null_mut();
    }

    record(|counters| counters.analyzers_opened += 1);
    Box::into_raw(Box::new(FakeKiwi {
        words: builder.words.iter().cloned().collect(),
    }))
    .cast()
}

unsafe extern "C" fn fake_builder_close(handle: *mut c_void) -> c_int {
    drop(Box::from_raw(handle.cast::<FakeBuilder>()));
    record(|counters| counters.builders_closed += 1);
    0
}

fn split_chunks(text: &str) -> Vec<(usize, String)> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    for (index, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                chunks.push((start, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                start = index;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        chunks.push((start, current));
    }
    chunks
}

fn fake_tag<'a>(kiwi: &'a FakeKiwi, chunk: &str) -> &'a str {
    if let Some(tag) = kiwi.words.get(chunk) {
        return tag;
    }
    if chunk == "#bad" {
        return "ZZZ";
    }
    if chunk.chars().all(|ch| ch.is_ascii_punctuation()) {
        return "SF";
    }
    "NNG"
}

unsafe extern "C" fn fake_analyze(
    handle: *mut c_void,
    text: *const c_char,
    top_n: c_int,
    option: KiwiAnalyzeOption,
    _pretokenized: *mut c_void,
) -> *mut c_void {
    record(|counters| {
        counters.last_top_n = Some(top_n);
        counters.last_match_options = Some(option.match_options);
        counters.last_open_ending = Some(option.open_ending);
        counters.last_allowed_dialects = Some(option.allowed_dialects);
        counters.last_dialect_cost = Some(option.dialect_cost);
    });

    let kiwi = &*handle.cast::<FakeKiwi>();
    let text = read_c_str(text);
    if text.contains("fail-analyze") {
        set_error("analysis aborted");
        return ptr::null_mut();
    }

    let scores = [FIRST_CANDIDATE_SCORE, SECOND_CANDIDATE_SCORE];
    let candidate_count = usize::try_from(top_n).unwrap_or(0).min(scores.len());
    let candidates: Vec<(Vec<FakeToken>, f32)> = scores[..candidate_count]
        .iter()
        .map(|score| {
            let tokens: Vec<FakeToken> = split_chunks(&text)
                .into_iter()
                .map(|(position, chunk)| FakeToken {
                    position: position as c_int,
                    tag: CString::new(fake_tag(kiwi, &chunk)).unwrap_or_default(),
                    form: CString::new(chunk).unwrap_or_default(),
                })
                .collect();
            (tokens, *score)
        })
        .collect();

    record(|counters| counters.results_opened += 1);
    Box::into_raw(Box::new(FakeResult { candidates })).cast()
}

unsafe extern "C" fn fake_close(handle: *mut c_void) -> c_int {
    drop(Box::from_raw(handle.cast::<FakeKiwi>()));
    record(|counters| counters.analyzers_closed += 1);
    0
}

unsafe fn fake_token<'a>(handle: *mut c_void, index: c_int, num: c_int) -> Option<&'a FakeToken> {
    let result = &*handle.cast::<FakeResult>();
    let (tokens, _) = result.candidates.get(usize::try_from(index).ok()?)?;
    tokens.get(usize::try_from(num).ok()?)
}

unsafe extern "C" fn fake_res_size(handle: *mut c_void) -> c_int {
    (*handle.cast::<FakeResult>()).candidates.len() as c_int
}

unsafe extern "C" fn fake_res_word_num(handle: *mut c_void, index: c_int) -> c_int {
    let result = &*handle.cast::<FakeResult>();
    usize::try_from(index)
        .ok()
        .and_then(|index| result.candidates.get(index))
        .map_or(-1, |(tokens, _)| tokens.len() as c_int)
}

unsafe extern "C" fn fake_res_tag(handle: *mut c_void, index: c_int, num: c_int) -> *const c_char {
    fake_token(handle, index, num).map_or(ptr::null(), |token| token.tag.as_ptr())
}

unsafe extern "C" fn fake_res_form(handle: *mut c_void, index: c_int, num: c_int) -> *const c_char {
    fake_token(handle, index, num).map_or(ptr::null(), |token| token.form.as_ptr())
}

unsafe extern "C" fn fake_res_position(handle: *mut c_void, index: c_int, num: c_int) -> c_int {
    fake_token(handle, index, num).map_or(-1, |token| token.position)
}

unsafe extern "C" fn fake_res_prob(handle: *mut c_void, index: c_int) -> c_float {
    let result = &*handle.cast::<FakeResult>();
    usize::try_from(index)
        .ok()
        .and_then(|index| result.candidates.get(index))
        .map_or(0.0, |(_, score)| *score)
}

unsafe extern "C" fn fake_res_close(handle: *mut c_void) -> c_int {
    drop(Box::from_raw(handle.cast::<FakeResult>()));
    record(|counters| counters.results_closed += 1);
    0
}

/// Fresh function table; also resets the per-thread counters.
pub(crate) fn fake_api() -> KiwiApi {
    COUNTERS.with(|cell| cell.set(FakeCounters::default()));
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = None;
    });
    KiwiApi {
        kiwi_version: fake_version,
        kiwi_error: fake_error,
        kiwi_clear_error: fake_clear_error,
        kiwi_builder_init: fake_builder_init,
        kiwi_builder_add_word: fake_builder_add_word,
        kiwi_builder_load_dict: Some(fake_builder_load_dict),
        kiwi_builder_build: fake_builder_build,
        kiwi_builder_close: fake_builder_close,
        kiwi_analyze: fake_analyze,
        kiwi_close: fake_close,
        kiwi_res_size: fake_res_size,
        kiwi_res_word_num: fake_res_word_num,
        kiwi_res_tag: fake_res_tag,
        kiwi_res_form: fake_res_form,
        kiwi_res_position: fake_res_position,
        kiwi_res_prob: fake_res_prob,
        kiwi_res_close: fake_res_close,
    }
}

pub(crate) fn fake_library() -> KiwiLibrary {
    KiwiLibrary::from_api(fake_api())
}
