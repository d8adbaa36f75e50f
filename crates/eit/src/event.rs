//! EITのイベント1件分のレコード。

use crate::desc::{
    Descriptor, DescriptorWalker, ExtendedEventDescriptor, Options, ShortEventDescriptor,
    UnrecognizedDescriptor,
};
use crate::error::DecodeError;
use crate::lang::LangCode;
use crate::text::TextDecoder;
use crate::time::{Duration, StartTime};
use crate::utils;

/// 固定長ヘッダーのバイト数。
pub const HEADER_LEN: usize = 12;

/// 進行状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunningStatus {
    /// 未定義。
    Undefined,
    /// 非実行中。
    NotRunning,
    /// 数秒以内に開始（例：映像記録用）。
    StartsSoon,
    /// 停止中。
    Pausing,
    /// 実行中。
    Running,
    /// サービス休止中。
    OffAir,
    /// 予約（6または7）。
    Reserved(u8),
}

impl RunningStatus {
    /// 3ビットの値を返す。
    pub fn value(&self) -> u8 {
        match *self {
            RunningStatus::Undefined => 0,
            RunningStatus::NotRunning => 1,
            RunningStatus::StartsSoon => 2,
            RunningStatus::Pausing => 3,
            RunningStatus::Running => 4,
            RunningStatus::OffAir => 5,
            RunningStatus::Reserved(v) => v,
        }
    }
}

impl From<u8> for RunningStatus {
    #[inline]
    fn from(value: u8) -> RunningStatus {
        match value & 0b111 {
            0 => RunningStatus::Undefined,
            1 => RunningStatus::NotRunning,
            2 => RunningStatus::StartsSoon,
            3 => RunningStatus::Pausing,
            4 => RunningStatus::Running,
            5 => RunningStatus::OffAir,
            v => RunningStatus::Reserved(v),
        }
    }
}

/// 複数の拡張形式イベント記述子をつなげた一つの拡張記述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedEventBlock {
    /// 最初の断片の言語コード。
    pub lang_code: Option<LangCode>,
    /// 断片をつなげた拡張記述。
    pub text: String,
    /// 最後の断片まで揃っているかどうか。
    pub complete: bool,
}

/// EITのイベント1件分のレコード。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// イベント識別。
    pub event_id: u16,
    /// 開始時間。
    pub start_time: StartTime,
    /// 継続時間。
    pub duration: Duration,
    /// 進行状態。
    pub running_status: RunningStatus,
    /// スクランブル。
    pub free_ca_mode: bool,
    /// ヘッダーに記載された記述子ループ長（12ビット）。
    pub descriptors_loop_length: u16,
    /// 記述子ループ中の記述子。
    pub descriptors: Vec<Descriptor>,
}

impl EventRecord {
    /// 新しい[`TextDecoder`]と既定のオプションで`data`から`EventRecord`を読み取る。
    #[inline]
    pub fn read(data: &[u8]) -> Result<EventRecord, DecodeError> {
        EventRecord::read_with(data, &mut TextDecoder::new(), Options::DEFAULT)
    }

    /// `decoder`と`options`を使い`data`から`EventRecord`を読み取る。
    ///
    /// 記述子ループは`descriptors_loop_length`ではなく`data`の終端まで読む。
    /// `decoder`に前のレコードからの持ち越しが残っている場合はエラーとなる。
    /// 記述子ループの途中でエラーとなった場合、`decoder`の持ち越しは破棄される。
    pub fn read_with(
        data: &[u8],
        decoder: &mut TextDecoder,
        options: Options,
    ) -> Result<EventRecord, DecodeError> {
        decoder
            .begin_record()
            .map_err(|source| DecodeError::Text { offset: 0, source })?;

        if data.len() < HEADER_LEN {
            log::debug!("invalid EventRecord");
            return Err(DecodeError::InsufficientHeader { len: data.len() });
        }

        let event_id = utils::read_be_16(&data[0..=1]);
        let (Some(start_time), Some(duration)) =
            (StartTime::read(&data[2..=6]), Duration::read(&data[7..=9]))
        else {
            return Err(DecodeError::InsufficientHeader { len: data.len() });
        };
        let running_status = RunningStatus::from((data[10] & 0b11100000) >> 5);
        let free_ca_mode = data[10] & 0b00010000 != 0;
        let descriptors_loop_length = utils::read_be_16(&data[10..=11]) & 0b0000_1111_1111_1111;

        let available = data.len() - HEADER_LEN;
        if descriptors_loop_length as usize != available {
            log::debug!(
                "EventRecord::descriptors_loop_length is {} but {} bytes follow",
                descriptors_loop_length,
                available
            );
        }

        let mut walker = DescriptorWalker::new(data, HEADER_LEN, options);
        let mut descriptors = Vec::new();
        loop {
            match walker.next_descriptor(decoder) {
                Ok(Some(desc)) => descriptors.push(desc),
                Ok(None) => break,
                Err(e) => {
                    // 失敗したレコードの持ち越しは次のレコードに残さない
                    decoder.reset();
                    return Err(e);
                }
            }
        }

        if !decoder.carryover().is_empty() {
            log::warn!(
                "event {} ends with {} undecoded bytes",
                event_id,
                decoder.carryover().len()
            );
        }

        Ok(EventRecord {
            event_id,
            start_time,
            duration,
            running_status,
            free_ca_mode,
            descriptors_loop_length,
            descriptors,
        })
    }

    /// 短形式イベント記述子を順に返す。
    pub fn short_events(&self) -> impl Iterator<Item = &ShortEventDescriptor> {
        self.descriptors.iter().filter_map(|d| match d {
            Descriptor::ShortEvent(d) => Some(d),
            _ => None,
        })
    }

    /// 拡張形式イベント記述子を順に返す。
    pub fn extended_event_fragments(&self) -> impl Iterator<Item = &ExtendedEventDescriptor> {
        self.descriptors.iter().filter_map(|d| match d {
            Descriptor::ExtendedEvent(d) => Some(d),
            _ => None,
        })
    }

    /// 読み飛ばした記述子を順に返す。
    pub fn unrecognized(&self) -> impl Iterator<Item = &UnrecognizedDescriptor> {
        self.descriptors.iter().filter_map(|d| match d {
            Descriptor::Unrecognized(d) => Some(d),
            _ => None,
        })
    }

    /// 拡張形式イベント記述子の断片をつなげた拡張記述を返す。
    ///
    /// `descriptor_number`が0の断片で新しい拡張記述が始まり、
    /// `last_descriptor_number`と等しい断片で終わる。
    pub fn extended_events(&self) -> Vec<ExtendedEventBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<ExtendedEventBlock> = None;

        for ext in self.extended_event_fragments() {
            if ext.descriptor_number == 0 {
                blocks.extend(current.take());
            }

            let block = current.get_or_insert_with(|| ExtendedEventBlock {
                lang_code: ext.lang_code,
                text: String::new(),
                complete: false,
            });
            block.text.push_str(&ext.text);

            if ext.is_last() {
                block.complete = true;
                blocks.extend(current.take());
            }
        }

        blocks.extend(current);
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextError;
    use assert_matches::assert_matches;
    use hex_literal::hex;

    #[test]
    fn test_running_status() {
        assert_eq!(RunningStatus::from(0), RunningStatus::Undefined);
        assert_eq!(RunningStatus::from(4), RunningStatus::Running);
        assert_eq!(RunningStatus::from(5), RunningStatus::OffAir);
        assert_eq!(RunningStatus::from(7), RunningStatus::Reserved(7));
        for v in 0..8 {
            assert_eq!(RunningStatus::from(v).value(), v);
        }
    }

    #[test]
    fn test_read_header() {
        let data = hex!(
            "
            12 34 C0 79 12 45 00 01 45 30 90 09
            4D 07 64 65 75 01 41 01 42
            "
        );
        let record = EventRecord::read(&data).unwrap();
        assert_eq!(record.event_id, 0x1234);
        assert_eq!(record.start_time.to_string(), "1993-10-13 12:45:00");
        assert_eq!(record.duration.to_string(), "01:45:30");
        assert_eq!(record.running_status, RunningStatus::Running);
        assert!(record.free_ca_mode);
        assert_eq!(record.descriptors_loop_length, 9);
        assert_eq!(record.descriptors.len(), 1);

        let short: Vec<_> = record.short_events().collect();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].index, 1);
        assert_eq!(short[0].event_name, "A");
        assert_eq!(short[0].text, "B");
    }

    #[test]
    fn test_read_header_only() {
        let record = EventRecord::read(&hex!("00 01 C0 79 12 45 00 00 30 00 20 00")).unwrap();
        assert_eq!(record.running_status, RunningStatus::NotRunning);
        assert!(!record.free_ca_mode);
        assert!(record.descriptors.is_empty());
    }

    #[test]
    fn test_read_insufficient() {
        assert_matches!(
            EventRecord::read(&[]),
            Err(DecodeError::InsufficientHeader { len: 0 })
        );
        assert_matches!(
            EventRecord::read(&hex!("00 01 C0 79 12 45 00 00 30 00 20")),
            Err(DecodeError::InsufficientHeader { len: 11 })
        );
    }

    #[test]
    fn test_extended_events() {
        let data = hex!(
            "
            00 01 C0 79 12 45 00 00 30 00 80 30
            4E 08 02 64 65 75 00 02 15 41
            4E 08 12 64 65 75 00 02 15 42
            4E 08 22 64 65 75 00 02 15 43
            4E 09 00 65 6E 67 00 03 15 58 59
            4E 08 01 66 72 61 00 02 15 5A
            "
        );
        let record = EventRecord::read(&data).unwrap();
        assert_eq!(record.extended_event_fragments().count(), 5);
        assert_eq!(
            record.extended_events(),
            [
                ExtendedEventBlock {
                    lang_code: Some(LangCode::DEU),
                    text: "ABC".into(),
                    complete: true,
                },
                ExtendedEventBlock {
                    lang_code: Some(LangCode::ENG),
                    text: "XY".into(),
                    complete: true,
                },
                ExtendedEventBlock {
                    lang_code: Some(LangCode::FRA),
                    text: "Z".into(),
                    complete: false,
                },
            ]
        );
    }

    #[test]
    fn test_reused_decoder() {
        // 最後の断片が「ü」の途中で終わっている
        let first = hex!(
            "
            00 01 C0 79 12 45 00 00 30 00 80 0A
            4E 08 00 64 65 75 00 02 15 C3
            "
        );
        let second = hex!("00 02 C0 79 12 45 00 00 30 00 80 00");

        let mut decoder = TextDecoder::new();
        EventRecord::read_with(&first, &mut decoder, Options::DEFAULT).unwrap();
        assert_eq!(decoder.carryover(), b"\xC3");

        assert_matches!(
            EventRecord::read_with(&second, &mut decoder, Options::DEFAULT),
            Err(DecodeError::Text {
                offset: 0,
                source: TextError::DanglingCarryover { len: 1 },
            })
        );

        let record = EventRecord::read_with(&second, &mut decoder, Options::DEFAULT).unwrap();
        assert_eq!(record.event_id, 2);
    }

    #[test]
    fn test_failed_record_discards_carryover() {
        // 最初の断片が「ü」の途中で終わり、次の断片が途切れている
        let broken = hex!(
            "
            00 01 C0 79 12 45 00 00 30 00 80 12
            4E 08 01 64 65 75 00 02 15 C3
            4E 06 11 64 65 75 00 05
            "
        );
        let valid = hex!("00 02 C0 79 12 45 00 00 30 00 80 00");

        let mut decoder = TextDecoder::new();
        assert_matches!(
            EventRecord::read_with(&broken, &mut decoder, Options::DEFAULT),
            Err(DecodeError::UnexpectedEnd { field: "text", .. })
        );
        assert!(decoder.carryover().is_empty());

        let record = EventRecord::read_with(&valid, &mut decoder, Options::DEFAULT).unwrap();
        assert_eq!(record.event_id, 2);
    }

    #[test]
    fn test_error_offset() {
        let data = hex!(
            "
            00 01 C0 79 12 45 00 00 30 00 80 0B
            4D 09 64 65 75 00 04 15 41 FF 42
            "
        );
        let err = EventRecord::read(&data).unwrap_err();
        assert_matches!(
            err,
            DecodeError::Text {
                offset: 19,
                source: TextError::InvalidSequence { offset: 2, .. },
            }
        );
        assert_eq!(err.offset(), 21);
    }
}
