//! DVBのEIT（Event Information Table）のイベントを読み込むためのクレート。
//!
//! 受信機が録画と共に保存するイベント1件分のバイト列を[`EventRecord`]にデコードする。

#![deny(missing_docs)]

pub mod desc;
pub mod error;
pub mod event;
pub mod lang;
pub mod text;
pub mod time;
mod utils;

pub use desc::{Descriptor, Options};
pub use error::DecodeError;
pub use event::EventRecord;
pub use text::{escape_json, TextDecoder};
