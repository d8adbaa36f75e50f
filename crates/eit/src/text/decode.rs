//! 文字列のUTF-8への変換と、記述子をまたいで途切れた文字の持ち越し。

use std::borrow::Cow;

use arrayvec::ArrayVec;
use encoding_rs::{DecoderResult, Encoding};

use super::charset::{self, Charset};
use super::TextError;

/// 持ち越せる最大のバイト数。
///
/// 対応する文字符号表において、途切れた文字は最大3バイトである。
const CARRYOVER_CAPACITY: usize = 4;

/// デコードされた文字列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// 適用された文字符号表。
    pub charset: Charset,
    /// UTF-8に変換された文字列。
    pub text: String,
    /// 末尾の文字が途切れており、次の文字列に持ち越したかどうか。
    pub partial: bool,
}

/// 文字列のデコーダー。
///
/// 拡張形式イベント記述子の文字列は記述子をまたいで文字が分割されることがあるため、
/// 変換しきれなかった末尾のバイト列を保持し、継続する文字列の先頭に付け加える。
///
/// 持ち越しはこのデコーダーにのみ属する。
/// 複数のレコードで使い回す場合は、各レコードの先頭で[`TextDecoder::begin_record`]を呼ぶこと。
#[derive(Debug, Default, Clone)]
pub struct TextDecoder {
    carryover: ArrayVec<u8, CARRYOVER_CAPACITY>,
}

impl TextDecoder {
    /// 持ち越しのない`TextDecoder`を生成する。
    #[inline]
    pub fn new() -> TextDecoder {
        TextDecoder::default()
    }

    /// 持ち越されているバイト列を返す。
    #[inline]
    pub fn carryover(&self) -> &[u8] {
        &self.carryover
    }

    /// 持ち越しを破棄する。
    #[inline]
    pub fn reset(&mut self) {
        self.carryover.clear();
    }

    /// 新しいレコードのデコードを始める。
    ///
    /// 前のレコードからの持ち越しが残っていた場合、それを破棄した上で
    /// [`TextError::DanglingCarryover`]を返す。
    pub fn begin_record(&mut self) -> Result<(), TextError> {
        if self.carryover.is_empty() {
            return Ok(());
        }

        let len = self.carryover.len();
        self.carryover.clear();
        Err(TextError::DanglingCarryover { len })
    }

    /// 文字符号表の選択バイトを含む文字列`field`をデコードする。
    ///
    /// `continuation`が真の場合、前の文字列から持ち越されたバイト列を先頭に付け加えてから変換する。
    /// 末尾の文字が途切れている場合はそのバイト列を持ち越し、それまでの文字列を返す。
    pub fn decode(&mut self, field: &[u8], continuation: bool) -> Result<DecodedText, TextError> {
        let (charset, prefix) = charset::select(field)?;
        let body = &field[prefix..];

        let carried = std::mem::take(&mut self.carryover);
        let (input, carried_len) = if continuation && !carried.is_empty() {
            let mut joined = Vec::with_capacity(carried.len() + body.len());
            joined.extend_from_slice(&carried);
            joined.extend_from_slice(body);
            (Cow::Owned(joined), carried.len())
        } else {
            if !carried.is_empty() {
                log::warn!(
                    "discarding {} carried-over bytes before a new text field",
                    carried.len()
                );
            }
            (Cow::Borrowed(body), 0)
        };

        let (text, tail) = convert(charset, &input).map_err(|pos| TextError::InvalidSequence {
            charset,
            offset: prefix + pos.saturating_sub(carried_len),
        })?;

        if tail > 0 {
            let pending = &input[input.len() - tail..];
            if self.carryover.try_extend_from_slice(pending).is_err() {
                return Err(TextError::CarryoverOverflow { len: tail });
            }
            log::trace!("carrying over {:02X?} in {}", pending, charset);
        }

        Ok(DecodedText {
            charset,
            text,
            partial: tail > 0,
        })
    }
}

/// `input`を`charset`からUTF-8に変換し、途切れた末尾のバイト数と共に返す。
///
/// 不正なバイト列がある場合はその位置を`Err`で返す。
fn convert(charset: Charset, input: &[u8]) -> Result<(String, usize), usize> {
    match charset.encoding() {
        None => Ok((input.iter().map(|&b| b as char).collect(), 0)),
        Some(encoding) if charset.is_single_byte() => {
            convert_single_byte(encoding, input).map(|text| (text, 0))
        }
        Some(encoding) => convert_multi_byte(encoding, input),
    }
}

/// C1制御符号かどうかを返す。
#[inline]
fn is_c1(b: u8) -> bool {
    matches!(b, 0x80..=0x9F)
}

/// 1バイト符号表の変換。
///
/// 0x80～0x9FはC1制御符号としてそのままの符号位置に変換する。
fn convert_single_byte(encoding: &'static Encoding, input: &[u8]) -> Result<String, usize> {
    let mut text = String::with_capacity(input.len());
    let mut rem = input;
    let mut pos = 0;

    loop {
        let run_len = rem.iter().position(|&b| is_c1(b)).unwrap_or(rem.len());
        let (run, tail) = rem.split_at(run_len);
        if !run.is_empty() {
            match encoding.decode_without_bom_handling_and_without_replacement(run) {
                Some(s) => text.push_str(&s),
                None => {
                    let bad = run
                        .iter()
                        .position(|b| {
                            encoding
                                .decode_without_bom_handling_and_without_replacement(
                                    std::slice::from_ref(b),
                                )
                                .is_none()
                        })
                        .unwrap_or(0);
                    return Err(pos + bad);
                }
            }
        }

        let [c1, ref tail @ ..] = *tail else {
            break;
        };
        text.push(c1 as char);
        pos += run_len + 1;
        rem = tail;
    }

    Ok(text)
}

/// 複数バイト符号表の変換。
///
/// 入力の終端で文字が途切れている場合、そのバイト数を返す。
fn convert_multi_byte(encoding: &'static Encoding, input: &[u8]) -> Result<(String, usize), usize> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut text = String::new();
    let mut read = 0;

    loop {
        let rem = &input[read..];
        text.reserve(
            decoder
                .max_utf8_buffer_length_without_replacement(rem.len())
                .unwrap_or(rem.len() * 3 + 4),
        );

        let (result, n) = decoder.decode_to_string_without_replacement(rem, &mut text, false);
        read += n;
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad, consumed) => {
                return Err(read.saturating_sub(bad as usize + consumed as usize));
            }
        }
    }

    // 入力を使い切った時点でデコーダーに残っているのは途切れた文字のみ
    let mut tail = 0;
    loop {
        text.reserve(
            decoder
                .max_utf8_buffer_length_without_replacement(0)
                .unwrap_or(4),
        );

        let (result, _) = decoder.decode_to_string_without_replacement(&[], &mut text, true);
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad, _) => tail += bad as usize,
        }
    }

    Ok((text, tail.min(input.len())))
}
