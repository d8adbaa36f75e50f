mod json;

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use eit::{EventRecord, Options, TextDecoder};

#[derive(Debug)]
struct AppArgs {
    skip_unknown: bool,
    max_size: usize,
    paths: Vec<PathBuf>,
}

impl AppArgs {
    const HELP: &str = "\
EITファイルの内容をJSONで表示するコマンド

USAGE:
  eit-dump [OPTIONS] <PATH>...

FLAGS:
  -h, --help          このヘルプを表示する
  --skip-unknown      未知の記述子を読み飛ばし、unparsed_descriptorsとして表示する

OPTIONS:
  --max-size [BYTES]  読み込むファイルの大きさの上限。
                      この大きさに達したファイルはEITではないとみなす。
                      未指定の場合は2000。

ARGS:
  <PATH>...           表示するEITファイルのパス
";

    const DEFAULT_MAX_SIZE: usize = 2000;

    pub fn parse() -> anyhow::Result<AppArgs> {
        let mut args = pico_args::Arguments::from_env();

        if args.contains(["-h", "--help"]) {
            println!("{}", Self::HELP);
            std::process::exit(0);
        }

        let skip_unknown = args.contains("--skip-unknown");
        let max_size = args
            .opt_value_from_str("--max-size")?
            .unwrap_or(Self::DEFAULT_MAX_SIZE);
        let paths: Vec<PathBuf> = args.finish().into_iter().map(PathBuf::from).collect();
        if paths.is_empty() {
            bail!("no input file\n\n{}", Self::HELP);
        }

        Ok(AppArgs {
            skip_unknown,
            max_size,
            paths,
        })
    }

    fn options(&self) -> Options {
        if self.skip_unknown {
            Options::LENIENT
        } else {
            Options::DEFAULT
        }
    }
}

/// `path`の内容を最大`max_size`バイト読み込む。
fn read_file(path: &Path, max_size: usize) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut buf = Vec::with_capacity(max_size);
    file.take(max_size as u64)
        .read_to_end(&mut buf)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if buf.len() >= max_size {
        bail!(
            "{} is {} bytes or larger, probably not an EIT",
            path.display(),
            max_size
        );
    }

    Ok(buf)
}

fn dump(path: &Path, args: &AppArgs, decoder: &mut TextDecoder) -> anyhow::Result<String> {
    let data = read_file(path, args.max_size)?;

    decoder.reset();
    let record = EventRecord::read_with(&data, decoder, args.options()).with_context(|| {
        format!("failed to decode {}", path.display())
    })?;
    log::debug!(
        "{}: {} descriptors in {} bytes",
        path.display(),
        record.descriptors.len(),
        data.len()
    );

    let mut out = String::new();
    json::write_record(
        &mut out,
        &path.to_string_lossy(),
        &record,
        args.skip_unknown,
    )?;
    Ok(out)
}

/// `args.paths`のファイルを順に読み込み、JSONとして`out`に書き込む。
///
/// 読み込めなかったファイルは出力せずに残りのファイルを処理し、`Ok(false)`を返す。
fn run<W: Write>(args: &AppArgs, out: &mut W) -> std::io::Result<bool> {
    let mut decoder = TextDecoder::new();
    let mut objects = Vec::with_capacity(args.paths.len());
    let mut succeeded = true;
    for path in &args.paths {
        match dump(path, args, &mut decoder) {
            Ok(object) => objects.push(object),
            Err(e) => {
                log::error!("{:#}", e);
                succeeded = false;
            }
        }
    }

    if args.paths.len() > 1 {
        writeln!(out, "[")?;
        if !objects.is_empty() {
            writeln!(out, "{}", objects.join(",\n"))?;
        }
        writeln!(out, "]")?;
    } else {
        for object in &objects {
            writeln!(out, "{}", object)?;
        }
    }
    out.flush()?;

    Ok(succeeded)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args = AppArgs::parse()?;
    let stdout = std::io::stdout();
    let succeeded = run(&args, &mut stdout.lock())?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
