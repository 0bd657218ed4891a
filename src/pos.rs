//! Part-of-speech tags produced by the Kiwi tagger.
//!
//! The table below follows the tag scheme shipped with the native engine. When
//! the engine introduces a tag missing here, decoding fails with
//! [`KiwiError::UnknownTag`] instead of passing an unchecked string through.

use std::fmt;
use std::str::FromStr;

use crate::error::{KiwiError, Result};

/// Native release whose tag scheme this table was checked against.
pub const TAG_SET_VERSION: (u32, u32, u32) = (0, 22, 2);

macro_rules! pos_types {
    ($( $(#[$doc:meta])* $variant:ident => $tag:literal, )+) => {
        /// Closed set of part-of-speech tags.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PosType {
            $( $(#[$doc])* $variant, )+
        }

        impl PosType {
            /// Every tag, in table order.
            pub const ALL: &'static [PosType] = &[$(PosType::$variant),+];

            /// Native tag string.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( PosType::$variant => $tag, )+
                }
            }

            fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $( $tag => Some(PosType::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

pos_types! {
    /// General noun.
    Nng => "NNG",
    /// Proper noun.
    Nnp => "NNP",
    /// Bound noun.
    Nnb => "NNB",
    /// Numeral.
    Nr => "NR",
    /// Pronoun.
    Np => "NP",
    /// Verb.
    Vv => "VV",
    /// Adjective.
    Va => "VA",
    /// Auxiliary predicate.
    Vx => "VX",
    /// Positive copula.
    Vcp => "VCP",
    /// Negative copula.
    Vcn => "VCN",
    /// Determiner.
    Mm => "MM",
    /// General adverb.
    Mag => "MAG",
    /// Conjunctive adverb.
    Maj => "MAJ",
    /// Interjection.
    Ic => "IC",
    /// Subject case marker.
    Jks => "JKS",
    /// Complement case marker.
    Jkc => "JKC",
    /// Adnominal case marker.
    Jkg => "JKG",
    /// Object case marker.
    Jko => "JKO",
    /// Adverbial case marker.
    Jkb => "JKB",
    /// Vocative case marker.
    Jkv => "JKV",
    /// Quotative case marker.
    Jkq => "JKQ",
    /// Auxiliary particle.
    Jx => "JX",
    /// Conjunctive particle.
    Jc => "JC",
    /// Pre-final ending.
    Ep => "EP",
    /// Final ending.
    Ef => "EF",
    /// Connective ending.
    Ec => "EC",
    /// Nominalizing ending.
    Etn => "ETN",
    /// Adnominalizing ending.
    Etm => "ETM",
    /// Noun prefix.
    Xpn => "XPN",
    /// Noun-deriving suffix.
    Xsn => "XSN",
    /// Verb-deriving suffix.
    Xsv => "XSV",
    /// Adjective-deriving suffix.
    Xsa => "XSA",
    /// Adverb-deriving suffix.
    Xsm => "XSM",
    /// Root.
    Xr => "XR",
    /// Terminal punctuation.
    Sf => "SF",
    /// Separator punctuation.
    Sp => "SP",
    /// Quotation mark or bracket.
    Ss => "SS",
    /// Opening quotation mark or bracket.
    Sso => "SSO",
    /// Closing quotation mark or bracket.
    Ssc => "SSC",
    /// Ellipsis.
    Se => "SE",
    /// Hyphen or tilde.
    So => "SO",
    /// Other symbol.
    Sw => "SW",
    /// Latin-script word.
    Sl => "SL",
    /// Hanja.
    Sh => "SH",
    /// Number.
    Sn => "SN",
    /// List bullet.
    Sb => "SB",
    /// Unanalyzable.
    Un => "UN",
    /// URL.
    WUrl => "W_URL",
    /// Email address.
    WEmail => "W_EMAIL",
    /// Mention.
    WMention => "W_MENTION",
    /// Hashtag.
    WHashtag => "W_HASHTAG",
    /// Serial number.
    WSerial => "W_SERIAL",
    /// Emoji.
    WEmoji => "W_EMOJI",
    /// Detached coda.
    ZCoda => "Z_CODA",
    /// Detached saisiot.
    ZSiot => "Z_SIOT",
    /// User-defined tag 0.
    User0 => "USER0",
    /// User-defined tag 1.
    User1 => "USER1",
    /// User-defined tag 2.
    User2 => "USER2",
    /// User-defined tag 3.
    User3 => "USER3",
    /// User-defined tag 4.
    User4 => "USER4",
    /// Irregular verb.
    VvIrregular => "VV-I",
    /// Irregular adjective.
    VaIrregular => "VA-I",
    /// Irregular auxiliary predicate.
    VxIrregular => "VX-I",
    /// Irregular adjective-deriving suffix.
    XsaIrregular => "XSA-I",
}

impl PosType {
    /// Parses a native tag string.
    ///
    /// The explicit-regular spellings (`VV-R`, `VA-R`, `VX-R`, `XSA-R`) are
    /// accepted and map to the plain tag.
    pub fn parse(tag: &str) -> Result<Self> {
        let canonical = match tag {
            "VV-R" => "VV",
            "VA-R" => "VA",
            "VX-R" => "VX",
            "XSA-R" => "XSA",
            other => other,
        };
        Self::from_tag(canonical).ok_or_else(|| KiwiError::UnknownTag(tag.to_string()))
    }

    /// Returns `true` for the irregular-conjugation variants.
    pub const fn is_irregular(self) -> bool {
        matches!(
            self,
            PosType::VvIrregular
                | PosType::VaIrregular
                | PosType::VxIrregular
                | PosType::XsaIrregular
        )
    }

    /// Maps an irregular variant to its plain tag; other tags are unchanged.
    pub const fn to_regular(self) -> Self {
        match self {
            PosType::VvIrregular => PosType::Vv,
            PosType::VaIrregular => PosType::Va,
            PosType::VxIrregular => PosType::Vx,
            PosType::XsaIrregular => PosType::Xsa,
            other => other,
        }
    }
}

impl FromStr for PosType {
    type Err = KiwiError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for PosType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
