//! 記述子に含まれる文字列のデコード。
//!
//! 文字列の先頭0～3バイトで文字符号表が選択され（[`charset`]）、
//! 残りのバイト列がUTF-8に変換される（[`decode`]）。

pub mod charset;
pub mod decode;
pub mod escape;

use thiserror::Error;

pub use charset::Charset;
pub use decode::{DecodedText, TextDecoder};
pub use escape::{escape_json, EscapeJson};

/// 文字列のデコードで発生するエラー。
///
/// オフセットはいずれも文字符号表の選択バイトを含む文字列先頭からの位置である。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// `0x10`による文字符号表の選択に必要な3バイトが存在しない。
    #[error("dynamically selected part of ISO/IEC 8859 needs 3 bytes, got {available}")]
    TruncatedSelector {
        /// 文字列の長さ。
        available: usize,
    },

    /// `0x10`に続く、0であるべきバイトが0でない。
    #[error("ISO/IEC 8859 table selector must start with 0x00, got {value:#04x}")]
    InvalidSelector {
        /// 実際の値。
        value: u8,
    },

    /// 不正なバイト列がある。
    #[error("invalid {charset} sequence at index {offset}")]
    InvalidSequence {
        /// 適用していた文字符号表。
        charset: Charset,
        /// 不正なバイト列の位置。
        offset: usize,
    },

    /// 途中で途切れた文字が持ち越し用のバッファに収まらない。
    #[error("incomplete sequence of {len} bytes cannot be carried over")]
    CarryoverOverflow {
        /// 途切れた文字のバイト数。
        len: usize,
    },

    /// 前のレコードから持ち越されたバイトが残っていた。
    #[error("{len} undecoded bytes carried over from the previous record")]
    DanglingCarryover {
        /// 残っていたバイト数。
        len: usize,
    },
}
