//! デコードしたレコードのJSON出力。

use std::fmt::{self, Write};

use eit::lang::LangCode;
use eit::{escape_json, EventRecord};

/// `record`を1つのJSONオブジェクトとして`w`に書き込む。
///
/// `unparsed`が`true`の場合、読み飛ばした記述子を`unparsed_descriptors`として書き込む。
pub fn write_record<W: Write>(
    w: &mut W,
    filename: &str,
    record: &EventRecord,
    unparsed: bool,
) -> fmt::Result {
    writeln!(w, " {{")?;
    writeln!(w, "  \"filename\": \"{}\",", escape_json(filename))?;
    writeln!(w, "  \"event_id\": {},", record.event_id)?;
    writeln!(w, "  \"start_time\": \"{}\",", record.start_time)?;
    writeln!(w, "  \"duration\": \"{}\",", record.duration)?;
    writeln!(w, "  \"running_status\": {},", record.running_status.value())?;
    write!(w, "  \"free_CA_mode\": {}", record.free_ca_mode as u8)?;

    for short in record.short_events() {
        writeln!(w, ",")?;
        writeln!(w, "  \"short_event_descriptor_{}\": {{", short.index)?;
        write_lang_code(w, Some(short.lang_code))?;
        writeln!(w, "    \"event_name\": \"{}\",", escape_json(&short.event_name))?;
        writeln!(w, "    \"text\": \"{}\"", escape_json(&short.text))?;
        write!(w, "  }}")?;
    }

    for (i, block) in record.extended_events().iter().enumerate() {
        writeln!(w, ",")?;
        writeln!(w, "  \"extended_event_descriptor_{}\": {{", i + 1)?;
        write_lang_code(w, block.lang_code)?;
        writeln!(w, "    \"text\": \"{}\",", escape_json(&block.text))?;
        writeln!(w, "    \"complete\": {}", block.complete)?;
        write!(w, "  }}")?;
    }

    if unparsed {
        writeln!(w, ",")?;
        write!(w, "  \"unparsed_descriptors\": [")?;
        for (i, desc) in record.unrecognized().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(w, "{{\"tag\": {}, \"length\": {}}}", desc.tag, desc.length)?;
        }
        write!(w, "]")?;
    }

    writeln!(w)?;
    write!(w, " }}")
}

fn write_lang_code<W: Write>(w: &mut W, lang_code: Option<LangCode>) -> fmt::Result {
    match lang_code {
        Some(code) => {
            // 言語コードの各バイトはLatin-1の文字として扱う
            let code: String = code.as_bytes().iter().map(|&b| b as char).collect();
            writeln!(
                w,
                "    \"iso_639_2_language_code\": \"{}\",",
                escape_json(&code)
            )
        }
        None => writeln!(w, "    \"iso_639_2_language_code\": null,"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(data: &[u8], unparsed: bool) -> String {
        let options = if unparsed {
            eit::Options::LENIENT
        } else {
            eit::Options::DEFAULT
        };
        let record =
            EventRecord::read_with(data, &mut eit::TextDecoder::new(), options).unwrap();
        let mut out = String::new();
        write_record(&mut out, "dir/\"a\".eit", &record, unparsed).unwrap();
        out
    }

    #[test]
    fn test_write_record() {
        let data = [
            0x00, 0x2A, 0xC0, 0x79, 0x12, 0x45, 0x00, 0x01, 0x30, 0x00, 0x90, 0x18, //
            0x4D, 0x0A, b'd', b'e', b'u', 0x02, b'"', b'A', 0x03, b'B', b'\n', b'C', //
            0x4E, 0x0A, 0x00, b'd', b'e', b'u', 0x00, 0x04, 0x15, b'x', b'y', b'z',
        ];
        assert_eq!(
            render(&data, false),
            " {
  \"filename\": \"dir/\\u0022a\\u0022.eit\",
  \"event_id\": 42,
  \"start_time\": \"1993-10-13 12:45:00\",
  \"duration\": \"01:30:00\",
  \"running_status\": 4,
  \"free_CA_mode\": 1,
  \"short_event_descriptor_1\": {
    \"iso_639_2_language_code\": \"deu\",
    \"event_name\": \"\\u0022A\",
    \"text\": \"B\\u000aC\"
  },
  \"extended_event_descriptor_1\": {
    \"iso_639_2_language_code\": \"deu\",
    \"text\": \"xyz\",
    \"complete\": true
  }
 }"
        );
    }

    #[test]
    fn test_write_unparsed() {
        let data = [
            0x00, 0x01, 0xC0, 0x79, 0x12, 0x45, 0x00, 0x00, 0x30, 0x00, 0x20, 0x06, //
            0x54, 0x02, 0x11, 0x22, 0x55, 0x00,
        ];
        assert_eq!(
            render(&data, true),
            " {
  \"filename\": \"dir/\\u0022a\\u0022.eit\",
  \"event_id\": 1,
  \"start_time\": \"1993-10-13 12:45:00\",
  \"duration\": \"00:30:00\",
  \"running_status\": 1,
  \"free_CA_mode\": 0,
  \"unparsed_descriptors\": [{\"tag\": 84, \"length\": 2},{\"tag\": 85, \"length\": 0}]
 }"
        );
    }

    #[test]
    fn test_write_lang_code() {
        let mut out = String::new();
        write_lang_code(&mut out, Some(LangCode(*b"d\"u"))).unwrap();
        assert_eq!(out, "    \"iso_639_2_language_code\": \"d\\u0022u\",\n");

        let mut out = String::new();
        write_lang_code(&mut out, Some(LangCode(*b"d\xE9u"))).unwrap();
        assert_eq!(out, "    \"iso_639_2_language_code\": \"d\u{e9}u\",\n");

        let mut out = String::new();
        write_lang_code(&mut out, None).unwrap();
        assert_eq!(out, "    \"iso_639_2_language_code\": null,\n");
    }
}
