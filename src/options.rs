//! Bitmask option sets mirrored from the Kiwi C API.
//!
//! Each set is a thin newtype over the native `int` mask. Members combine with
//! `|`, and the `ALL`-style unions are derived from the member constants
//! rather than copied from the C header.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::os::raw::c_int;

use crate::error::{KiwiError, Result};

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$member_meta:meta])*
                const $member:ident = $value:expr, $label:literal;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(c_int);

        impl $name {
            $(
                $(#[$member_meta])*
                pub const $member: Self = Self($value);
            )+

            const NAMED: &'static [(&'static str, Self)] = &[$(($label, Self::$member)),+];

            /// Set with no flag enabled.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Raw native mask.
            pub const fn bits(self) -> c_int {
                self.0
            }

            /// Wraps a raw native mask without checking its bits.
            pub const fn from_bits_retain(bits: c_int) -> Self {
                Self(bits)
            }

            /// Returns `true` when no bit is set.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns `true` when every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Sets every bit of `other`.
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            /// Clears every bit of `other`.
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            /// OR-combines any number of flags into the native mask.
            pub fn encode<I>(flags: I) -> c_int
            where
                I: IntoIterator<Item = Self>,
            {
                flags.into_iter().collect::<Self>().bits()
            }

            /// Looks up a member by its name (case-insensitive, `-` and `_`
            /// are interchangeable).
            pub fn from_name(name: &str) -> Option<Self> {
                let wanted = name.trim().replace('-', "_");
                Self::NAMED
                    .iter()
                    .find(|(label, _)| label.eq_ignore_ascii_case(&wanted))
                    .map(|(_, flag)| *flag)
            }

            /// Parses a `|` or `,` separated list of member names.
            pub fn parse_list(list: &str) -> Result<Self> {
                list.split(|c: char| c == '|' || c == ',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        Self::from_name(name).ok_or_else(|| {
                            KiwiError::InvalidArgument(format!(
                                "unknown {} flag: {name}",
                                stringify!($name)
                            ))
                        })
                    })
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl FromIterator<$name> for $name {
            fn from_iter<I: IntoIterator<Item = $name>>(iter: I) -> Self {
                iter.into_iter().fold(Self::empty(), |acc, flag| acc | flag)
            }
        }

        impl From<$name> for c_int {
            fn from(value: $name) -> c_int {
                value.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut names = Self::NAMED
                    .iter()
                    .filter(|(_, flag)| !flag.is_empty() && flag.0.count_ones() == 1)
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(label, _)| *label)
                    .peekable();
                write!(f, "{}(", stringify!($name))?;
                if names.peek().is_none() {
                    write!(f, "empty")?;
                }
                for (index, label) in names.enumerate() {
                    if index > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{label}")?;
                }
                write!(f, ")")
            }
        }
    };
}

flag_set! {
    /// Match options passed to `kiwi_analyze`.
    pub struct AnalyzeOption {
        /// URL detection.
        const URL = 1, "URL";
        /// Email detection.
        const EMAIL = 1 << 1, "EMAIL";
        /// Hashtag detection.
        const HASHTAG = 1 << 2, "HASHTAG";
        /// Mention detection.
        const MENTION = 1 << 3, "MENTION";
        /// Serial number detection.
        const SERIAL = 1 << 4, "SERIAL";
        /// Normalize coda.
        const NORMALIZE_CODA = 1 << 16, "NORMALIZE_CODA";
        /// Join noun prefixes.
        const JOIN_NOUN_PREFIX = 1 << 17, "JOIN_NOUN_PREFIX";
        /// Join noun suffixes.
        const JOIN_NOUN_SUFFIX = 1 << 18, "JOIN_NOUN_SUFFIX";
        /// Join verb suffixes.
        const JOIN_VERB_SUFFIX = 1 << 19, "JOIN_VERB_SUFFIX";
        /// Join adjective suffixes.
        const JOIN_ADJ_SUFFIX = 1 << 20, "JOIN_ADJ_SUFFIX";
        /// Join adverb suffixes.
        const JOIN_ADV_SUFFIX = 1 << 21, "JOIN_ADV_SUFFIX";
        /// Split complex morphemes.
        const SPLIT_COMPLEX = 1 << 22, "SPLIT_COMPLEX";
        /// Z-coda handling.
        const Z_CODA = 1 << 23, "Z_CODA";
        /// Emit compatible jamo.
        const COMPATIBLE_JAMO = 1 << 24, "COMPATIBLE_JAMO";
        /// Split saisiot.
        const SPLIT_SAISIOT = 1 << 25, "SPLIT_SAISIOT";
        /// Merge saisiot.
        const MERGE_SAISIOT = 1 << 26, "MERGE_SAISIOT";
        /// Verb and adjective suffix joins.
        const JOIN_V_SUFFIX = Self::JOIN_VERB_SUFFIX.0 | Self::JOIN_ADJ_SUFFIX.0, "JOIN_V_SUFFIX";
        /// Every affix-join flag.
        const JOIN_AFFIX = Self::JOIN_NOUN_PREFIX.0
            | Self::JOIN_NOUN_SUFFIX.0
            | Self::JOIN_V_SUFFIX.0
            | Self::JOIN_ADV_SUFFIX.0, "JOIN_AFFIX";
        /// Common default: every pattern matcher plus z-coda handling.
        const ALL = Self::URL.0
            | Self::EMAIL.0
            | Self::HASHTAG.0
            | Self::MENTION.0
            | Self::SERIAL.0
            | Self::Z_CODA.0, "ALL";
        /// [`Self::ALL`] with coda normalization.
        const ALL_WITH_NORMALIZING = Self::ALL.0 | Self::NORMALIZE_CODA.0, "ALL_WITH_NORMALIZING";
    }
}

flag_set! {
    /// Build options passed to `kiwi_builder_init`.
    pub struct BuildOption {
        /// Integrate allomorph variants.
        const INTEGRATE_ALLOMORPH = 1, "INTEGRATE_ALLOMORPH";
        /// Load the bundled default dictionary.
        const LOAD_DEFAULT_DICT = 1 << 1, "LOAD_DEFAULT_DICT";
        /// Load the typo dictionary.
        const LOAD_TYPO_DICT = 1 << 2, "LOAD_TYPO_DICT";
        /// Load the multi-word dictionary.
        const LOAD_MULTI_DICT = 1 << 3, "LOAD_MULTI_DICT";
        /// Default build mask.
        const DEFAULT = Self::INTEGRATE_ALLOMORPH.0
            | Self::LOAD_DEFAULT_DICT.0
            | Self::LOAD_TYPO_DICT.0
            | Self::LOAD_MULTI_DICT.0, "DEFAULT";
    }
}

flag_set! {
    /// Dialect mask used at build time (enabled) and analyze time (allowed).
    pub struct Dialect {
        /// Standard language only.
        const STANDARD = 0, "STANDARD";
        /// Gyeonggi.
        const GYEONGGI = 1, "GYEONGGI";
        /// Chungcheong.
        const CHUNGCHEONG = 1 << 1, "CHUNGCHEONG";
        /// Gangwon.
        const GANGWON = 1 << 2, "GANGWON";
        /// Gyeongsang.
        const GYEONGSANG = 1 << 3, "GYEONGSANG";
        /// Jeolla.
        const JEOLLA = 1 << 4, "JEOLLA";
        /// Jeju.
        const JEJU = 1 << 5, "JEJU";
        /// Hwanghae.
        const HWANGHAE = 1 << 6, "HWANGHAE";
        /// Hamgyeong.
        const HAMGYEONG = 1 << 7, "HAMGYEONG";
        /// Pyeongan.
        const PYEONGAN = 1 << 8, "PYEONGAN";
        /// Archaic expressions.
        const ARCHAIC = 1 << 9, "ARCHAIC";
        /// Every regional and archaic flag.
        const ALL = Self::GYEONGGI.0
            | Self::CHUNGCHEONG.0
            | Self::GANGWON.0
            | Self::GYEONGSANG.0
            | Self::JEOLLA.0
            | Self::JEJU.0
            | Self::HWANGHAE.0
            | Self::HAMGYEONG.0
            | Self::PYEONGAN.0
            | Self::ARCHAIC.0, "ALL";
    }
}

const MODEL_TYPE_MASK: c_int = 0x0f00;

/// Language model selected through bits 8..11 of the build mask.
///
/// The values are an enumeration, not independent flags, so they are applied
/// with [`BuildOption::with_model_type`] instead of `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelType {
    /// Let the engine pick.
    #[default]
    Default,
    /// Largest model found in the model directory.
    Largest,
    /// Kneser-Ney language model.
    Knlm,
    /// Skip-bigram model.
    Sbg,
    /// Contextual n-gram embedding model.
    Cong,
    /// CoNg model with global context.
    CongGlobal,
}

impl ModelType {
    /// Native bits of this model type.
    pub const fn bits(self) -> c_int {
        match self {
            ModelType::Default => 0x0000,
            ModelType::Largest => 0x0100,
            ModelType::Knlm => 0x0200,
            ModelType::Sbg => 0x0300,
            ModelType::Cong => 0x0400,
            ModelType::CongGlobal => 0x0500,
        }
    }

    fn from_bits(bits: c_int) -> Option<Self> {
        match bits & MODEL_TYPE_MASK {
            0x0000 => Some(ModelType::Default),
            0x0100 => Some(ModelType::Largest),
            0x0200 => Some(ModelType::Knlm),
            0x0300 => Some(ModelType::Sbg),
            0x0400 => Some(ModelType::Cong),
            0x0500 => Some(ModelType::CongGlobal),
            _ => None,
        }
    }
}

impl BuildOption {
    /// Replaces the model-type field, leaving the flag bits untouched.
    pub const fn with_model_type(self, model_type: ModelType) -> Self {
        Self((self.0 & !MODEL_TYPE_MASK) | model_type.bits())
    }

    /// Model type currently encoded in the mask, if it is a known value.
    pub fn model_type(self) -> Option<ModelType> {
        ModelType::from_bits(self.0)
    }
}
