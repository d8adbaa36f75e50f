//! JSONの文字列リテラルに埋め込むためのエスケープ。

use std::fmt::{self, Write};
use std::str::Chars;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// `"`、`\`およびU+0000～U+001Fを`\u00XX`に置き換えるイテレーターを返す。
///
/// それ以外の文字はそのまま返す。
#[inline]
pub fn escape_json(s: &str) -> EscapeJson {
    EscapeJson {
        chars: s.chars(),
        buf: [0; 6],
        pos: 6,
    }
}

/// [`escape_json`]が返すイテレーター。
///
/// [`Display`][`fmt::Display`]も実装しており、エスケープ後の文字列を直接書き出せる。
#[derive(Debug, Clone)]
pub struct EscapeJson<'a> {
    chars: Chars<'a>,
    buf: [u8; 6],
    pos: usize,
}

#[inline]
fn needs_escape(c: char) -> bool {
    matches!(c, '"' | '\\' | '\u{00}'..='\u{1F}')
}

impl<'a> Iterator for EscapeJson<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if let Some(&b) = self.buf.get(self.pos) {
            self.pos += 1;
            return Some(b as char);
        }

        let c = self.chars.next()?;
        if !needs_escape(c) {
            return Some(c);
        }

        let b = c as u8;
        self.buf = [
            b'\\',
            b'u',
            b'0',
            b'0',
            HEX_DIGITS[(b >> 4) as usize],
            HEX_DIGITS[(b & 0x0F) as usize],
        ];
        self.pos = 1;
        Some('\\')
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.buf.len() - self.pos.min(self.buf.len());
        let (lower, upper) = self.chars.size_hint();
        (
            lower + pending,
            upper.and_then(|n| n.checked_mul(6)?.checked_add(pending)),
        )
    }
}

impl<'a> std::iter::FusedIterator for EscapeJson<'a> {}

impl<'a> fmt::Display for EscapeJson<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.clone() {
            f.write_char(c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_json("").to_string(), "");
        assert_eq!(escape_json("Tagesschau").to_string(), "Tagesschau");
        assert_eq!(escape_json("Käse – 日本 𝄞").to_string(), "Käse – 日本 𝄞");
        // C1制御符号はエスケープしない
        assert_eq!(escape_json("a\u{8A}b").to_string(), "a\u{8A}b");
    }

    #[test]
    fn test_escape_quote_backslash() {
        assert_eq!(
            escape_json(r#"Der "Tatort" C:\"#).to_string(),
            r"Der \u0022Tatort\u0022 C:\u005c"
        );
    }

    #[test]
    fn test_escape_control() {
        assert_eq!(escape_json("\0").to_string(), r"\u0000");
        assert_eq!(escape_json("a\nb\tc").to_string(), r"a\u000ab\u0009c");
        assert_eq!(escape_json("\u{1F}\u{20}").to_string(), r"\u001f ");
    }

    #[test]
    fn test_escape_iter() {
        let escaped: Vec<char> = escape_json("\"x").collect();
        assert_eq!(escaped, ['\\', 'u', '0', '0', '2', '2', 'x']);

        // 呼び出しごとに独立している
        let iter = escape_json("\\");
        assert_eq!(iter.clone().count(), 6);
        assert_eq!(iter.to_string(), r"\u005c");
        assert_eq!(iter.to_string(), r"\u005c");
    }
}
