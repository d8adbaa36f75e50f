//! 文字符号表の選択（ETSI EN 300 468 Annex A）。

use std::fmt;

use encoding_rs::Encoding;

use super::TextError;

/// 文字列に適用される文字符号表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// ISO/IEC 8859-1（ラテン文字）。選択バイトがない場合の既定値。
    Iso8859_1,
    /// ISO/IEC 8859-2。
    Iso8859_2,
    /// ISO/IEC 8859-3。
    Iso8859_3,
    /// ISO/IEC 8859-4。
    Iso8859_4,
    /// ISO/IEC 8859-5（キリル文字）。
    Iso8859_5,
    /// ISO/IEC 8859-6（アラビア文字）。
    Iso8859_6,
    /// ISO/IEC 8859-7（ギリシャ文字）。
    Iso8859_7,
    /// ISO/IEC 8859-8（ヘブライ文字）。
    Iso8859_8,
    /// ISO/IEC 8859-9。
    Iso8859_9,
    /// ISO/IEC 8859-10。
    Iso8859_10,
    /// ISO/IEC 8859-11（タイ文字）。
    Iso8859_11,
    /// ISO/IEC 8859-13。
    Iso8859_13,
    /// ISO/IEC 8859-14。
    Iso8859_14,
    /// ISO/IEC 8859-15。
    Iso8859_15,
    /// ISO/IEC 10646の基本多言語面（2バイト、ビッグエンディアン）。
    Iso10646,
    /// GB2312（簡体字中国語）。
    Gb2312,
    /// ISO/IEC 10646のUTF-8符号化。
    Utf8,
}

impl Charset {
    /// 選択バイトがない場合に使われる文字符号表。
    pub const DEFAULT: Charset = Charset::Iso8859_1;

    /// 文字符号表の名前を返す。
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::Iso8859_2 => "ISO-8859-2",
            Charset::Iso8859_3 => "ISO-8859-3",
            Charset::Iso8859_4 => "ISO-8859-4",
            Charset::Iso8859_5 => "ISO-8859-5",
            Charset::Iso8859_6 => "ISO-8859-6",
            Charset::Iso8859_7 => "ISO-8859-7",
            Charset::Iso8859_8 => "ISO-8859-8",
            Charset::Iso8859_9 => "ISO-8859-9",
            Charset::Iso8859_10 => "ISO-8859-10",
            Charset::Iso8859_11 => "ISO-8859-11",
            Charset::Iso8859_13 => "ISO-8859-13",
            Charset::Iso8859_14 => "ISO-8859-14",
            Charset::Iso8859_15 => "ISO-8859-15",
            Charset::Iso10646 => "ISO-10646",
            Charset::Gb2312 => "GB2312",
            Charset::Utf8 => "UTF-8",
        }
    }

    /// 1バイトで1文字を表す文字符号表かどうかを返す。
    #[inline]
    pub fn is_single_byte(&self) -> bool {
        !matches!(self, Charset::Iso10646 | Charset::Gb2312 | Charset::Utf8)
    }

    /// 変換に使う`encoding_rs`のエンコーディングを返す。
    ///
    /// ISO/IEC 8859-1は1バイトをそのまま符号位置とするため`None`を返す。
    /// ISO/IEC 8859-9と8859-11は0x80～0x9F以外が一致するWindowsの符号表で代用する。
    pub(super) fn encoding(&self) -> Option<&'static Encoding> {
        let encoding = match self {
            Charset::Iso8859_1 => return None,
            Charset::Iso8859_2 => encoding_rs::ISO_8859_2,
            Charset::Iso8859_3 => encoding_rs::ISO_8859_3,
            Charset::Iso8859_4 => encoding_rs::ISO_8859_4,
            Charset::Iso8859_5 => encoding_rs::ISO_8859_5,
            Charset::Iso8859_6 => encoding_rs::ISO_8859_6,
            Charset::Iso8859_7 => encoding_rs::ISO_8859_7,
            Charset::Iso8859_8 => encoding_rs::ISO_8859_8,
            Charset::Iso8859_9 => encoding_rs::WINDOWS_1254,
            Charset::Iso8859_10 => encoding_rs::ISO_8859_10,
            Charset::Iso8859_11 => encoding_rs::WINDOWS_874,
            Charset::Iso8859_13 => encoding_rs::ISO_8859_13,
            Charset::Iso8859_14 => encoding_rs::ISO_8859_14,
            Charset::Iso8859_15 => encoding_rs::ISO_8859_15,
            Charset::Iso10646 => encoding_rs::UTF_16BE,
            Charset::Gb2312 => encoding_rs::GBK,
            Charset::Utf8 => encoding_rs::UTF_8,
        };
        Some(encoding)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::DEFAULT
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1バイトの選択符号（表A.3）。
fn single_byte_table(code: u8) -> Option<Charset> {
    let charset = match code {
        0x01 => Charset::Iso8859_5,
        0x02 => Charset::Iso8859_6,
        0x03 => Charset::Iso8859_7,
        0x04 => Charset::Iso8859_8,
        0x05 => Charset::Iso8859_9,
        0x06 => Charset::Iso8859_10,
        0x07 => Charset::Iso8859_11,
        0x09 => Charset::Iso8859_13,
        0x0A => Charset::Iso8859_14,
        0x0B => Charset::Iso8859_15,
        0x11 => Charset::Iso10646,
        0x13 => Charset::Gb2312,
        0x15 => Charset::Utf8,
        _ => return None,
    };
    Some(charset)
}

/// `0x10 0x00`に続く選択符号（表A.4）。
fn iso8859_table(code: u8) -> Option<Charset> {
    let charset = match code {
        0x01 => Charset::Iso8859_1,
        0x02 => Charset::Iso8859_2,
        0x03 => Charset::Iso8859_3,
        0x04 => Charset::Iso8859_4,
        0x05 => Charset::Iso8859_5,
        0x06 => Charset::Iso8859_6,
        0x07 => Charset::Iso8859_7,
        0x08 => Charset::Iso8859_8,
        0x09 => Charset::Iso8859_9,
        0x0A => Charset::Iso8859_10,
        0x0B => Charset::Iso8859_11,
        0x0D => Charset::Iso8859_13,
        0x0E => Charset::Iso8859_14,
        0x0F => Charset::Iso8859_15,
        _ => return None,
    };
    Some(charset)
}

/// 文字列`field`の先頭から文字符号表を選択し、選択に使ったバイト数と共に返す。
///
/// バイト数は0、1、3のいずれかである。
/// 未知の選択符号は既定の文字符号表として扱い、選択符号の分は消費する。
pub fn select(field: &[u8]) -> Result<(Charset, usize), TextError> {
    match *field {
        [] => Ok((Charset::DEFAULT, 0)),
        [first, ..] if first >= 0x20 => Ok((Charset::DEFAULT, 0)),
        [0x10, second, third, ..] => {
            if second != 0x00 {
                return Err(TextError::InvalidSelector { value: second });
            }

            let charset = iso8859_table(third).unwrap_or_else(|| {
                log::debug!("unknown ISO/IEC 8859 table: 0x10 0x00 {:#04x}", third);
                Charset::DEFAULT
            });
            Ok((charset, 3))
        }
        [0x10, ..] => Err(TextError::TruncatedSelector {
            available: field.len(),
        }),
        [first, ..] => {
            let charset = single_byte_table(first).unwrap_or_else(|| {
                log::debug!("unknown character table: {:#04x}", first);
                Charset::DEFAULT
            });
            Ok((charset, 1))
        }
    }
}
