/// `data`からビッグエンディアンで16ビット符号無し整数を読み込む。
///
/// 事前に`data`の長さが2以上あると分かるようなコードであれば最適化が期待できる。
#[inline]
pub fn read_be_16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

/// BCDで符号化された2桁の数値を読み込む。
///
/// 各ニブルが9を超えていても検証しないため、戻り値は最大で165になる。
#[inline]
pub fn read_bcd_digit(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// バイト列を先頭から順に読み進めるカーソル。
///
/// 位置は常に元のバイト列の先頭からのオフセットで表す。
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// `data`の`pos`バイト目から読み始めるカーソルを生成する。
    #[inline]
    pub fn new(data: &'a [u8], pos: usize) -> Cursor<'a> {
        Cursor {
            data,
            pos: pos.min(data.len()),
        }
    }

    /// 現在の位置を返す。
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// 残りのバイト数を返す。
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// 終端に到達したかどうかを返す。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 位置を終端まで進める。
    #[inline]
    pub fn finish(&mut self) {
        self.pos = self.data.len();
    }

    /// 1バイト読み込む。
    #[inline]
    pub fn read_u8(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// `n`バイト読み込む。
    ///
    /// 残りが`n`バイトに満たない場合は位置を進めずに`None`を返す。
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(bytes)
    }

    /// `N`バイトを配列として読み込む。
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_bytes(N)?.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_be_u16() {
        assert_eq!(read_be_16(b"\x12\x34\x56\x78"), 0x1234);
    }

    #[test]
    fn test_read_bcd_digit() {
        assert_eq!(read_bcd_digit(0x00), 0);
        assert_eq!(read_bcd_digit(0x45), 45);
        assert_eq!(read_bcd_digit(0x99), 99);
        assert_eq!(read_bcd_digit(0x1F), 25);
        assert_eq!(read_bcd_digit(0xFF), 165);
    }

    #[test]
    fn test_cursor() {
        let data = [0, 1, 2, 3, 4];
        let mut cur = Cursor::new(&data, 1);
        assert_eq!(cur.pos(), 1);
        assert_eq!(cur.remaining(), 4);

        assert_eq!(cur.read_u8(), Some(1));
        assert_eq!(cur.read_array::<2>(), Some([2, 3]));
        assert_eq!(cur.read_bytes(2), None);
        assert_eq!(cur.pos(), 4);
        assert_eq!(cur.read_bytes(1), Some(&[4][..]));
        assert!(cur.is_empty());
        assert_eq!(cur.read_u8(), None);
        assert_eq!(cur.read_bytes(0), Some(&[][..]));
    }

    #[test]
    fn test_cursor_finish() {
        let data = [0; 8];
        let cur = Cursor::new(&data, 20);
        assert!(cur.is_empty());

        let mut cur = Cursor::new(&data, 2);
        cur.finish();
        assert_eq!(cur.pos(), 8);
        assert_eq!(cur.read_bytes(usize::MAX), None);
    }
}
