//! EITにおける開始時間と継続時間。

use std::fmt;

use crate::utils;

/// BCDで符号化された時・分・秒。
///
/// 継続時間と開始時間の時刻部分は同じ形式で符号化される。
/// 各値は検証しないため、壊れたデータでは`hour`が99を超えることもある。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    /// 時。
    pub hour: u8,
    /// 分。
    pub minute: u8,
    /// 秒。
    pub second: u8,
}

impl Duration {
    /// 符号化された`Duration`のバイト数。
    pub const LEN: usize = 3;

    /// すべてのビットが1である`Duration`。
    const ALL_ONES: Duration = Duration {
        hour: 165,
        minute: 165,
        second: 165,
    };

    /// `data`の先頭3バイトから`Duration`を読み取る。
    ///
    /// データ長が不足している場合は`None`を返す。
    pub fn read(data: &[u8]) -> Option<Duration> {
        let [hour, minute, second, ..] = *data else {
            return None;
        };

        Some(Duration {
            hour: utils::read_bcd_digit(hour),
            minute: utils::read_bcd_digit(minute),
            second: utils::read_bcd_digit(second),
        })
    }

    /// 秒数に換算する。
    #[inline]
    pub fn as_secs(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// 修正ユリウス日から年月日を求める。
///
/// ETSI EN 300 468 Annex Cの近似式をそのまま用い、除算はすべて切り捨てる。
fn mjd_to_ymd(mjd: u16) -> (i32, i32, i32) {
    let mjd_f = mjd as f64;
    let ys = ((mjd_f - 15078.2) / 365.25) as i32;
    let ys_days = (ys as f64 * 365.25) as i32;
    let ms = ((mjd_f - 14956.1 - ys_days as f64) / 30.6001) as i32;
    let ms_days = (ms as f64 * 30.6001) as i32;

    let day = mjd as i32 - 14956 - ys_days - ms_days;
    let k = if ms == 14 || ms == 15 { 1 } else { 0 };

    (1900 + ys + k, ms - 1 - k * 12, day)
}

/// 修正ユリウス日とUTCの時刻からなる開始時間。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StartTime {
    /// 修正ユリウス日の下位16ビット。
    pub mjd: u16,
    /// 西暦年（1993年＝1993）。
    pub year: i32,
    /// 月（1月＝1、12月＝12）。
    pub month: i32,
    /// 日（1～31）。
    pub day: i32,
    /// 曜日（月曜日＝1、日曜日＝7）。
    pub day_of_week: u8,
    /// 時刻。
    pub time: Duration,
}

impl StartTime {
    /// 符号化された`StartTime`のバイト数。
    pub const LEN: usize = 5;

    /// `data`の先頭5バイトから`StartTime`を読み取る。
    ///
    /// データ長が不足している場合は`None`を返す。
    pub fn read(data: &[u8]) -> Option<StartTime> {
        let [d0, d1, ref rem @ ..] = *data else {
            return None;
        };
        let time = Duration::read(rem)?;

        let mjd = u16::from_be_bytes([d0, d1]);
        let (year, month, day) = mjd_to_ymd(mjd);
        let day_of_week = ((mjd as u32 + 2) % 7 + 1) as u8;

        Some(StartTime {
            mjd,
            year,
            month,
            day,
            day_of_week,
            time,
        })
    }

    /// 開始時間が未定義（NVOD基準サービスのイベント等）かどうかを返す。
    ///
    /// 未定義の場合、40ビットすべてが1になっている。
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.mjd == 0xFFFF && self.time == Duration::ALL_ONES
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {}",
            self.year, self.month, self.day, self.time
        )
    }
}
