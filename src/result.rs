use std::os::raw::{c_char, c_int, c_void};
use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::{KiwiError, Result};
use crate::native::{api_error, cstr_to_string, LoadedLibrary};
use crate::pos::PosType;
use crate::types::{TokenInfo, TokenResult};

/// Owns a `kiwi_res_h` until it is dropped.
///
/// Decoding copies everything out of native memory, so the returned values
/// stay valid after the guard releases the result set.
pub(crate) struct AnalyzeResult {
    inner: Arc<LoadedLibrary>,
    handle: NonNull<c_void>,
}

impl AnalyzeResult {
    pub(crate) fn new(inner: Arc<LoadedLibrary>, handle: NonNull<c_void>) -> Self {
        Self { inner, handle }
    }

    fn result_count(&self) -> Result<c_int> {
        let result_count = unsafe { (self.inner.api.kiwi_res_size)(self.handle.as_ptr()) };
        if result_count < 0 {
            return Err(api_error(&self.inner.api, "kiwi_res_size returned an error"));
        }
        Ok(result_count)
    }

    /// Materializes every candidate, best first as ranked by the engine.
    ///
    /// Fails as a whole if any token carries an unknown tag.
    pub(crate) fn decode(&self) -> Result<Vec<TokenResult>> {
        let result_count = self.result_count()?;

        let mut out = Vec::with_capacity(result_count as usize);
        for candidate_index in 0..result_count {
            let tokens = self.decode_candidate(candidate_index)?;
            let score = unsafe { (self.inner.api.kiwi_res_prob)(self.handle.as_ptr(), candidate_index) };
            out.push(TokenResult { tokens, score });
        }
        Ok(out)
    }

    fn decode_candidate(&self, candidate_index: c_int) -> Result<Vec<TokenInfo>> {
        let api = &self.inner.api;
        let handle = self.handle.as_ptr();
        let token_count = unsafe { (api.kiwi_res_word_num)(handle, candidate_index) };
        if token_count < 0 {
            return Err(api_error(api, "kiwi_res_word_num returned an error"));
        }

        let mut tokens = Vec::with_capacity(token_count as usize);
        for token_index in 0..token_count {
            let tag = self.read_string(
                unsafe { (api.kiwi_res_tag)(handle, candidate_index, token_index) },
                "kiwi_res_tag",
            )?;
            let tag = PosType::parse(&tag)?;

            let form = self.read_string(
                unsafe { (api.kiwi_res_form)(handle, candidate_index, token_index) },
                "kiwi_res_form",
            )?;

            let position = unsafe { (api.kiwi_res_position)(handle, candidate_index, token_index) };
            let position = usize::try_from(position).map_err(|_| {
                KiwiError::Api(format!(
                    "kiwi_res_position returned {position} for candidate {candidate_index}, token {token_index}"
                ))
            })?;

            tokens.push(TokenInfo {
                position,
                tag,
                form,
            });
        }

        Ok(tokens)
    }

    fn read_string(&self, pointer: *const c_char, function: &str) -> Result<String> {
        cstr_to_string(pointer)
            .ok_or_else(|| api_error(&self.inner.api, &format!("{function} returned a null pointer")))
    }
}

impl Drop for AnalyzeResult {
    fn drop(&mut self) {
        unsafe {
            (self.inner.api.kiwi_res_close)(self.handle.as_ptr());
        }
    }
}
