//! # Character Sets
//!
//! Converts Unicode strings to the printer's single-byte code tables.
//!
//! The printer must be switched to the matching table (`ESC t n`) for these
//! bytes to render correctly; [`Charset::code_table`] gives `n`. Printable
//! ASCII (U+0020–U+007E) passes through unchanged in every table. C0 control
//! characters and DEL are never copied into the output: they would be
//! interpreted as commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EncodingError;

/// Byte used by [`UnmappedPolicy::Replace`].
pub const REPLACEMENT: u8 = b'?';

/// Printer character code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// Printable 7-bit ASCII only.
    Ascii,
    /// IBM Code Page 437 (USA, Standard Europe).
    Pc437,
    /// IBM Code Page 852 (Latin-2, Central European).
    #[default]
    Pc852,
}

/// What to do with characters the charset cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Substitute [`REPLACEMENT`] and log a warning.
    #[default]
    Replace,
    /// Fail with [`EncodingError::UnsupportedCharacter`].
    Strict,
}

impl Charset {
    /// `n` for the `ESC t n` command selecting this table.
    pub fn code_table(self) -> u8 {
        match self {
            Charset::Ascii | Charset::Pc437 => 0,
            Charset::Pc852 => 18,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Charset::Ascii => "ascii",
            Charset::Pc437 => "pc437",
            Charset::Pc852 => "pc852",
        }
    }

    /// Map one character to its byte, or `None` if the table lacks it.
    pub fn encode_char(self, ch: char) -> Option<u8> {
        let code = ch as u32;
        if (0x20..0x7F).contains(&code) {
            return Some(code as u8);
        }
        match self {
            Charset::Ascii => None,
            Charset::Pc437 => unicode_to_pc437(ch),
            Charset::Pc852 => unicode_to_pc852(ch),
        }
    }

    /// Encode a whole string under the given policy.
    pub fn encode(self, s: &str, policy: UnmappedPolicy) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            match self.encode_char(ch) {
                Some(byte) => out.push(byte),
                None => match policy {
                    UnmappedPolicy::Replace => {
                        warn!(
                            charset = self.name(),
                            "unmapped character {:?} (U+{:04X}), replacing with '?'",
                            ch,
                            ch as u32
                        );
                        out.push(REPLACEMENT);
                    }
                    UnmappedPolicy::Strict => {
                        return Err(EncodingError::UnsupportedCharacter {
                            ch,
                            code: ch as u32,
                            charset: self.name(),
                        });
                    }
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "ascii" => Ok(Charset::Ascii),
            "pc437" | "cp437" | "437" => Ok(Charset::Pc437),
            "pc852" | "cp852" | "852" | "latin2" | "pc852latin2" => Ok(Charset::Pc852),
            other => Err(format!("unknown charset '{}'", other)),
        }
    }
}

/// Map a Unicode code point to its CP437 byte value (0x80–0xFF).
fn unicode_to_pc437(ch: char) -> Option<u8> {
    let byte = match ch {
        // 0x80–0x8F
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'å' => 0x86,
        'ç' => 0x87,
        'ê' => 0x88,
        'ë' => 0x89,
        'è' => 0x8A,
        'ï' => 0x8B,
        'î' => 0x8C,
        'ì' => 0x8D,
        'Ä' => 0x8E,
        'Å' => 0x8F,

        // 0x90–0x9F
        'É' => 0x90,
        'æ' => 0x91,
        'Æ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'ò' => 0x95,
        'û' => 0x96,
        'ù' => 0x97,
        'ÿ' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        '¢' => 0x9B,
        '£' => 0x9C,
        '¥' => 0x9D,
        '₧' => 0x9E,
        'ƒ' => 0x9F,

        // 0xA0–0xAF
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'ñ' => 0xA4,
        'Ñ' => 0xA5,
        'ª' => 0xA6,
        'º' => 0xA7,
        '¿' => 0xA8,
        '⌐' => 0xA9,
        '¬' => 0xAA,
        '½' => 0xAB,
        '¼' => 0xAC,
        '¡' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,

        // 0xB0–0xDF: shades, box drawing, blocks
        '░' => 0xB0,
        '▒' => 0xB1,
        '▓' => 0xB2,
        '│' => 0xB3,
        '┤' => 0xB4,
        '╡' => 0xB5,
        '╢' => 0xB6,
        '╖' => 0xB7,
        '╕' => 0xB8,
        '╣' => 0xB9,
        '║' => 0xBA,
        '╗' => 0xBB,
        '╝' => 0xBC,
        '╜' => 0xBD,
        '╛' => 0xBE,
        '┐' => 0xBF,
        '└' => 0xC0,
        '┴' => 0xC1,
        '┬' => 0xC2,
        '├' => 0xC3,
        '─' => 0xC4,
        '┼' => 0xC5,
        '╞' => 0xC6,
        '╟' => 0xC7,
        '╚' => 0xC8,
        '╔' => 0xC9,
        '╩' => 0xCA,
        '╦' => 0xCB,
        '╠' => 0xCC,
        '═' => 0xCD,
        '╬' => 0xCE,
        '╧' => 0xCF,
        '╨' => 0xD0,
        '╤' => 0xD1,
        '╥' => 0xD2,
        '╙' => 0xD3,
        '╘' => 0xD4,
        '╒' => 0xD5,
        '╓' => 0xD6,
        '╫' => 0xD7,
        '╪' => 0xD8,
        '┘' => 0xD9,
        '┌' => 0xDA,
        '█' => 0xDB,
        '▄' => 0xDC,
        '▌' => 0xDD,
        '▐' => 0xDE,
        '▀' => 0xDF,

        // 0xE0–0xFF: Greek, math
        'α' => 0xE0,
        'ß' => 0xE1,
        'Γ' => 0xE2,
        'π' => 0xE3,
        'Σ' => 0xE4,
        'σ' => 0xE5,
        'µ' => 0xE6,
        'τ' => 0xE7,
        'Φ' => 0xE8,
        'Θ' => 0xE9,
        'Ω' => 0xEA,
        'δ' => 0xEB,
        '∞' => 0xEC,
        'φ' => 0xED,
        'ε' => 0xEE,
        '∩' => 0xEF,
        '≡' => 0xF0,
        '±' => 0xF1,
        '≥' => 0xF2,
        '≤' => 0xF3,
        '⌠' => 0xF4,
        '⌡' => 0xF5,
        '÷' => 0xF6,
        '≈' => 0xF7,
        '°' => 0xF8,
        '∙' => 0xF9,
        '·' => 0xFA,
        '√' => 0xFB,
        'ⁿ' => 0xFC,
        '²' => 0xFD,
        '■' => 0xFE,
        '\u{00A0}' => 0xFF,

        _ => return None,
    };
    Some(byte)
}

/// Map a Unicode code point to its CP852 (Latin-2) byte value (0x80–0xFF).
fn unicode_to_pc852(ch: char) -> Option<u8> {
    let byte = match ch {
        // 0x80–0x8F
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'ů' => 0x85,
        'ć' => 0x86,
        'ç' => 0x87,
        'ł' => 0x88,
        'ë' => 0x89,
        'Ő' => 0x8A,
        'ő' => 0x8B,
        'î' => 0x8C,
        'Ź' => 0x8D,
        'Ä' => 0x8E,
        'Ć' => 0x8F,

        // 0x90–0x9F
        'É' => 0x90,
        'Ĺ' => 0x91,
        'ĺ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'Ľ' => 0x95,
        'ľ' => 0x96,
        'Ś' => 0x97,
        'ś' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        'Ť' => 0x9B,
        'ť' => 0x9C,
        'Ł' => 0x9D,
        '×' => 0x9E,
        'č' => 0x9F,

        // 0xA0–0xAF
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'Ą' => 0xA4,
        'ą' => 0xA5,
        'Ž' => 0xA6,
        'ž' => 0xA7,
        'Ę' => 0xA8,
        'ę' => 0xA9,
        '¬' => 0xAA,
        'ź' => 0xAB,
        'Č' => 0xAC,
        'ş' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,

        // 0xB0–0xBF
        '░' => 0xB0,
        '▒' => 0xB1,
        '▓' => 0xB2,
        '│' => 0xB3,
        '┤' => 0xB4,
        'Á' => 0xB5,
        'Â' => 0xB6,
        'Ě' => 0xB7,
        'Ş' => 0xB8,
        '╣' => 0xB9,
        '║' => 0xBA,
        '╗' => 0xBB,
        '╝' => 0xBC,
        'Ż' => 0xBD,
        'ż' => 0xBE,
        '┐' => 0xBF,

        // 0xC0–0xCF
        '└' => 0xC0,
        '┴' => 0xC1,
        '┬' => 0xC2,
        '├' => 0xC3,
        '─' => 0xC4,
        '┼' => 0xC5,
        'Ă' => 0xC6,
        'ă' => 0xC7,
        '╚' => 0xC8,
        '╔' => 0xC9,
        '╩' => 0xCA,
        '╦' => 0xCB,
        '╠' => 0xCC,
        '═' => 0xCD,
        '╬' => 0xCE,
        '¤' => 0xCF,

        // 0xD0–0xDF
        'đ' => 0xD0,
        'Đ' => 0xD1,
        'Ď' => 0xD2,
        'Ë' => 0xD3,
        'ď' => 0xD4,
        'Ň' => 0xD5,
        'Í' => 0xD6,
        'Î' => 0xD7,
        'ě' => 0xD8,
        '┘' => 0xD9,
        '┌' => 0xDA,
        '█' => 0xDB,
        '▄' => 0xDC,
        'Ţ' => 0xDD,
        'Ů' => 0xDE,
        '▀' => 0xDF,

        // 0xE0–0xEF
        'Ó' => 0xE0,
        'ß' => 0xE1,
        'Ô' => 0xE2,
        'Ń' => 0xE3,
        'ń' => 0xE4,
        'ň' => 0xE5,
        'Š' => 0xE6,
        'š' => 0xE7,
        'Ŕ' => 0xE8,
        'Ú' => 0xE9,
        'ŕ' => 0xEA,
        'Ű' => 0xEB,
        'ý' => 0xEC,
        'Ý' => 0xED,
        'ţ' => 0xEE,
        '´' => 0xEF,

        // 0xF0–0xFF
        '\u{00AD}' => 0xF0, // soft hyphen
        '˝' => 0xF1,
        '˛' => 0xF2,
        'ˇ' => 0xF3,
        '˘' => 0xF4,
        '§' => 0xF5,
        '÷' => 0xF6,
        '¸' => 0xF7,
        '°' => 0xF8,
        '¨' => 0xF9,
        '˙' => 0xFA,
        'ű' => 0xFB,
        'Ř' => 0xFC,
        'ř' => 0xFD,
        '■' => 0xFE,
        '\u{00A0}' => 0xFF,

        _ => return None,
    };
    Some(byte)
}
