//! レコードのデコードで発生するエラー。

use thiserror::Error;

use crate::text::TextError;

/// [`EventRecord::read`][`crate::event::EventRecord::read`]で発生するエラー。
///
/// オフセットはいずれもレコード先頭からの位置である。
/// 同期を取り直す目印がない形式のため、エラーが発生したレコードの続きは読まない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// 固定長のヘッダーに必要なバイト数がない。
    #[error("insufficient length for an event header: {len} bytes")]
    InsufficientHeader {
        /// レコードの長さ。
        len: usize,
    },

    /// フィールドの途中でレコードが終わっている。
    #[error("unexpected end of record at offset {offset} while reading {field}")]
    UnexpectedEnd {
        /// 読み取ろうとした位置。
        offset: usize,
        /// 読み取ろうとしたフィールド。
        field: &'static str,
    },

    /// 拡張形式イベント記述子の項目には対応していない。
    #[error("extended event items ({length} bytes) at offset {offset} are not supported")]
    UnsupportedItems {
        /// `length_of_items`の位置。
        offset: usize,
        /// `length_of_items`の値。
        length: u8,
    },

    /// コンポーネント記述子の長さが固定部の6バイトに満たない。
    #[error("component descriptor at offset {offset} is too short: {length} bytes")]
    ShortComponent {
        /// 記述子の位置。
        offset: usize,
        /// `descriptor_length`の値。
        length: u8,
    },

    /// 後続データのある位置に未知の記述子がある。
    #[error(
        "unknown descriptor tag {tag:#04x} (length {length}) at offset {offset}, \
         {remaining} bytes left"
    )]
    UnknownDescriptor {
        /// 記述子の位置。
        offset: usize,
        /// 記述子のタグ。
        tag: u8,
        /// `descriptor_length`の値。
        length: u8,
        /// タグと長さを読んだ後の残りバイト数。
        remaining: usize,
    },

    /// 文字列のデコードに失敗した。
    #[error("text at offset {offset}: {source}")]
    Text {
        /// 文字列の位置。
        offset: usize,
        /// 文字列のエラー。
        #[source]
        source: TextError,
    },
}

impl DecodeError {
    /// エラーの原因となったバイトのレコード先頭からの位置を返す。
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::InsufficientHeader { len } => len,
            DecodeError::UnexpectedEnd { offset, .. } => offset,
            DecodeError::UnsupportedItems { offset, .. } => offset,
            DecodeError::ShortComponent { offset, .. } => offset,
            DecodeError::UnknownDescriptor { offset, .. } => offset,
            DecodeError::Text { offset, ref source } => match *source {
                TextError::InvalidSequence { offset: pos, .. } => offset + pos,
                _ => offset,
            },
        }
    }
}
