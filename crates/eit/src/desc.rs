//! イベントの記述子とその記述子ループ。

use crate::error::DecodeError;
use crate::lang::LangCode;
use crate::text::{DecodedText, TextDecoder};
use crate::utils::Cursor;

/// 短形式イベント記述子のタグ。
pub const SHORT_EVENT: u8 = 0x4D;
/// 拡張形式イベント記述子のタグ。
pub const EXTENDED_EVENT: u8 = 0x4E;
/// コンポーネント記述子のタグ。
pub const COMPONENT: u8 = 0x50;

/// 未知の記述子の扱い。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnknownDescriptors {
    /// 後続データがある場合はエラーとする。
    #[default]
    Reject,
    /// `descriptor_length`分読み飛ばす。
    Skip,
}

/// 記述子ループを読む際のオプション。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// 未知の記述子の扱い。
    pub unknown_descriptors: UnknownDescriptors,
}

impl Options {
    /// 既定のオプション。未知の記述子はエラーとする。
    pub const DEFAULT: Options = Options {
        unknown_descriptors: UnknownDescriptors::Reject,
    };

    /// 未知の記述子を読み飛ばすオプション。
    pub const LENIENT: Options = Options {
        unknown_descriptors: UnknownDescriptors::Skip,
    };
}

impl Default for Options {
    fn default() -> Self {
        Options::DEFAULT
    }
}

/// 短形式イベント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortEventDescriptor {
    /// レコード中で何番目の短形式イベント記述子か（1始まり）。
    pub index: usize,
    /// ISO 639-2で規定される3文字の言語コード。
    pub lang_code: LangCode,
    /// 番組名。
    pub event_name: String,
    /// 番組記述。
    pub text: String,
    /// タグと長さを含め、読み進めたバイト数。
    pub consumed: usize,
}

/// 拡張形式イベント記述子。
///
/// 一つの文章が複数の記述子に分割されて送られ、
/// `descriptor_number`が`last_descriptor_number`と等しいものが最後の断片となる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedEventDescriptor {
    /// 記述子番号（4ビット）。
    pub descriptor_number: u8,
    /// 最終記述子番号（4ビット）。
    pub last_descriptor_number: u8,
    /// ISO 639-2で規定される3文字の言語コード。
    ///
    /// 最初の断片（`descriptor_number`が0）にのみ設定する。
    pub lang_code: Option<LangCode>,
    /// 拡張記述の断片。
    pub text: String,
    /// 末尾の文字が途切れ、次の断片に持ち越されたかどうか。
    pub partial: bool,
    /// タグと長さを含め、読み進めたバイト数。
    pub consumed: usize,
}

impl ExtendedEventDescriptor {
    /// 最後の断片かどうかを返す。
    #[inline]
    pub fn is_last(&self) -> bool {
        self.descriptor_number == self.last_descriptor_number
    }
}

/// コンポーネント記述子。
///
/// 6バイトの固定部以降（コンポーネント記述）は読まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// コンポーネント内容の拡張（4ビット）。
    pub stream_content_ext: u8,
    /// コンポーネント内容（4ビット）。
    pub stream_content: u8,
    /// コンポーネント種別。
    pub component_type: u8,
    /// コンポーネントタグ。
    pub component_tag: u8,
    /// ISO 639-2で規定される3文字の言語コード。
    pub lang_code: LangCode,
    /// タグと長さを含め、読み進めたバイト数。
    pub consumed: usize,
}

/// 読まなかった記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedDescriptor {
    /// 記述子のタグ。
    pub tag: u8,
    /// `descriptor_length`の値。
    pub length: u8,
    /// タグと長さを含め、読み進めたバイト数。
    pub consumed: usize,
}

/// 記述子ループ中の記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// 短形式イベント記述子。
    ShortEvent(ShortEventDescriptor),
    /// 拡張形式イベント記述子。
    ExtendedEvent(ExtendedEventDescriptor),
    /// コンポーネント記述子。
    Component(ComponentDescriptor),
    /// 未知の記述子。
    Unrecognized(UnrecognizedDescriptor),
}

impl Descriptor {
    /// 記述子のタグを返す。
    pub fn tag(&self) -> u8 {
        match self {
            Descriptor::ShortEvent(_) => SHORT_EVENT,
            Descriptor::ExtendedEvent(_) => EXTENDED_EVENT,
            Descriptor::Component(_) => COMPONENT,
            Descriptor::Unrecognized(d) => d.tag,
        }
    }

    /// タグと長さを含め、この記述子で読み進めたバイト数を返す。
    pub fn consumed(&self) -> usize {
        match self {
            Descriptor::ShortEvent(d) => d.consumed,
            Descriptor::ExtendedEvent(d) => d.consumed,
            Descriptor::Component(d) => d.consumed,
            Descriptor::Unrecognized(d) => d.consumed,
        }
    }
}

/// [`DescriptorWalker`]の状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkState {
    /// 読むべきバイトが残っている。
    Scanning,
    /// 終端に到達した。
    Done,
}

/// 記述子ループを先頭から一つずつ読み進める。
///
/// 短形式・拡張形式イベント記述子はフィールドごとに読み進め、
/// コンポーネント記述子の可変部と読み飛ばす未知の記述子は`descriptor_length`で読み進める。
/// エラーが発生した場合は以降を読まず、[`WalkState::Done`]となる。
#[derive(Debug, Clone)]
pub struct DescriptorWalker<'a> {
    cursor: Cursor<'a>,
    options: Options,
    short_events: usize,
    state: WalkState,
}

fn read_u8(cursor: &mut Cursor, field: &'static str) -> Result<u8, DecodeError> {
    let offset = cursor.pos();
    cursor
        .read_u8()
        .ok_or(DecodeError::UnexpectedEnd { offset, field })
}

fn read_bytes<'a>(
    cursor: &mut Cursor<'a>,
    n: usize,
    field: &'static str,
) -> Result<&'a [u8], DecodeError> {
    let offset = cursor.pos();
    cursor
        .read_bytes(n)
        .ok_or(DecodeError::UnexpectedEnd { offset, field })
}

fn read_lang_code(cursor: &mut Cursor) -> Result<LangCode, DecodeError> {
    let offset = cursor.pos();
    match cursor.read_array() {
        Some(code) => Ok(LangCode(code)),
        None => Err(DecodeError::UnexpectedEnd {
            offset,
            field: "ISO_639_language_code",
        }),
    }
}

/// 1バイトの長さに続く文字列を読み取る。
fn read_text(
    cursor: &mut Cursor,
    decoder: &mut TextDecoder,
    field: &'static str,
    continuation: bool,
) -> Result<DecodedText, DecodeError> {
    let length = read_u8(cursor, field)?;
    let offset = cursor.pos();
    let bytes = read_bytes(cursor, length as usize, field)?;

    decoder
        .decode(bytes, continuation)
        .map_err(|source| DecodeError::Text { offset, source })
}

impl<'a> DescriptorWalker<'a> {
    /// `record`の`start`バイト目から終端までを記述子ループとして読む`DescriptorWalker`を生成する。
    pub fn new(record: &'a [u8], start: usize, options: Options) -> DescriptorWalker<'a> {
        let cursor = Cursor::new(record, start);
        let state = if cursor.is_empty() {
            WalkState::Done
        } else {
            WalkState::Scanning
        };

        DescriptorWalker {
            cursor,
            options,
            short_events: 0,
            state,
        }
    }

    /// 現在の状態を返す。
    #[inline]
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// 次に読む位置をレコード先頭からのオフセットで返す。
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.pos()
    }

    /// これまでに読んだ短形式イベント記述子の数を返す。
    #[inline]
    pub fn short_event_count(&self) -> usize {
        self.short_events
    }

    /// 次の記述子を読み取る。
    ///
    /// 終端に到達している場合は`Ok(None)`を返す。
    pub fn next_descriptor(
        &mut self,
        decoder: &mut TextDecoder,
    ) -> Result<Option<Descriptor>, DecodeError> {
        if self.state == WalkState::Done || self.cursor.is_empty() {
            self.state = WalkState::Done;
            return Ok(None);
        }

        match self.read_descriptor(decoder) {
            Ok(desc) => {
                if self.cursor.is_empty() {
                    self.state = WalkState::Done;
                }
                Ok(Some(desc))
            }
            Err(e) => {
                self.cursor.finish();
                self.state = WalkState::Done;
                Err(e)
            }
        }
    }

    fn read_descriptor(&mut self, decoder: &mut TextDecoder) -> Result<Descriptor, DecodeError> {
        let start = self.cursor.pos();
        let tag = read_u8(&mut self.cursor, "descriptor_tag")?;
        let length = read_u8(&mut self.cursor, "descriptor_length")?;
        log::trace!("descriptor {:#04x} (length {}) at {}", tag, length, start);

        let desc = match tag {
            SHORT_EVENT => Descriptor::ShortEvent(self.read_short_event(start, decoder)?),
            EXTENDED_EVENT => Descriptor::ExtendedEvent(self.read_extended_event(start, decoder)?),
            COMPONENT => Descriptor::Component(self.read_component(start, length)?),
            _ => Descriptor::Unrecognized(self.read_unknown(start, tag, length)?),
        };

        let declared = 2 + length as usize;
        if desc.consumed() != declared {
            log::debug!(
                "descriptor {:#04x} at {} declares {} bytes but {} were read",
                tag,
                start,
                declared,
                desc.consumed()
            );
        }

        Ok(desc)
    }

    fn read_short_event(
        &mut self,
        start: usize,
        decoder: &mut TextDecoder,
    ) -> Result<ShortEventDescriptor, DecodeError> {
        self.short_events += 1;

        let cursor = &mut self.cursor;
        let lang_code = read_lang_code(cursor)?;
        let event_name = read_text(cursor, decoder, "event_name", false)?;
        let text = read_text(cursor, decoder, "text", false)?;

        Ok(ShortEventDescriptor {
            index: self.short_events,
            lang_code,
            event_name: event_name.text,
            text: text.text,
            consumed: self.cursor.pos() - start,
        })
    }

    fn read_extended_event(
        &mut self,
        start: usize,
        decoder: &mut TextDecoder,
    ) -> Result<ExtendedEventDescriptor, DecodeError> {
        let cursor = &mut self.cursor;
        let numbers = read_u8(cursor, "descriptor_number")?;
        let descriptor_number = numbers >> 4;
        let last_descriptor_number = numbers & 0x0F;

        let lang_code = read_lang_code(cursor)?;

        let items_offset = cursor.pos();
        let length_of_items = read_u8(cursor, "length_of_items")?;
        if length_of_items != 0 {
            return Err(DecodeError::UnsupportedItems {
                offset: items_offset,
                length: length_of_items,
            });
        }

        let text = read_text(cursor, decoder, "text", descriptor_number > 0)?;

        Ok(ExtendedEventDescriptor {
            descriptor_number,
            last_descriptor_number,
            lang_code: (descriptor_number == 0).then_some(lang_code),
            text: text.text,
            partial: text.partial,
            consumed: cursor.pos() - start,
        })
    }

    fn read_component(&mut self, start: usize, length: u8) -> Result<ComponentDescriptor, DecodeError> {
        if length < 6 {
            return Err(DecodeError::ShortComponent {
                offset: start,
                length,
            });
        }

        let cursor = &mut self.cursor;
        let [b0, component_type, component_tag] = match cursor.read_array() {
            Some(header) => header,
            None => {
                return Err(DecodeError::UnexpectedEnd {
                    offset: cursor.pos(),
                    field: "component_tag",
                })
            }
        };
        let lang_code = read_lang_code(cursor)?;
        read_bytes(cursor, length as usize - 6, "text_char")?;

        Ok(ComponentDescriptor {
            stream_content_ext: b0 >> 4,
            stream_content: b0 & 0x0F,
            component_type,
            component_tag,
            lang_code,
            consumed: cursor.pos() - start,
        })
    }

    fn read_unknown(
        &mut self,
        start: usize,
        tag: u8,
        length: u8,
    ) -> Result<UnrecognizedDescriptor, DecodeError> {
        let cursor = &mut self.cursor;
        if !cursor.is_empty() {
            match self.options.unknown_descriptors {
                UnknownDescriptors::Reject => {
                    log::debug!(
                        "unknown descriptor {:#04x} with {} bytes left",
                        tag,
                        cursor.remaining()
                    );
                    return Err(DecodeError::UnknownDescriptor {
                        offset: start,
                        tag,
                        length,
                        remaining: cursor.remaining(),
                    });
                }
                UnknownDescriptors::Skip => {
                    read_bytes(cursor, length as usize, "descriptor payload")?;
                }
            }
        }

        Ok(UnrecognizedDescriptor {
            tag,
            length,
            consumed: cursor.pos() - start,
        })
    }
}
