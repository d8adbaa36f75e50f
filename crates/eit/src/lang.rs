//! 記述子で使用される言語コード。

use std::fmt;

/// ISO 639-2で規定される3文字の言語コード。
///
/// 値は検証せず、受信したバイト列をそのまま保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LangCode(pub [u8; 3]);

impl LangCode {
    /// ドイツ語。
    pub const DEU: LangCode = LangCode(*b"deu");
    /// 英語。
    pub const ENG: LangCode = LangCode(*b"eng");
    /// フランス語。
    pub const FRA: LangCode = LangCode(*b"fra");
    /// イタリア語。
    pub const ITA: LangCode = LangCode(*b"ita");
    /// スペイン語。
    pub const SPA: LangCode = LangCode(*b"spa");
    /// ロシア語。
    pub const RUS: LangCode = LangCode(*b"rus");
    /// 原語（ISO 639-2の`qaa`）。
    pub const ORIGINAL: LangCode = LangCode(*b"qaa");

    /// 言語コードのバイト列を返す。
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.escape_ascii().fmt(f)
    }
}
