use std::path::PathBuf;

use anyhow::{bail, Context};
use damai::config::types::Config;
use damai::document::TextDocument;
use damai::editor::Editor;
use damai::input::parse_key_sequence;
use damai::layout::TextLayout;

const USAGE: &str = "usage: damai [--config PATH] [--keys SEQ] [--json] FILE\n       damai --print-default-config";

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    keys: String,
    json: bool,
    file: Option<PathBuf>,
}

fn main() {
    // Handle --print-default-config before any other initialization
    if std::env::args().any(|a| a == "--print-default-config") {
        print!("{}", Config::print_default());
        return;
    }

    env_logger::init();
    log::info!("damai v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{e:#}");
        eprintln!("damai: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let Some(file) = args.file else {
        bail!("missing FILE\n{USAGE}");
    };

    let config_path = args.config.unwrap_or_else(dirs_config_path);
    let config = match Config::load(&config_path) {
        Ok(cfg) => {
            log::info!("Config loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            log::warn!("Config load error ({}), using defaults", e);
            Config::default()
        }
    };

    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
    let keys = parse_key_sequence(&args.keys).context("parsing --keys")?;

    let mut editor = Editor::new(TextLayout::new(&text, config.layout.clone()), &config);
    for key in &keys {
        let outcome = editor.handle_key(key);
        log::debug!("{:?} -> {:?}", key, outcome);
    }

    let content = editor.backend().text_content();
    let cursor = editor.cursor_box();
    if args.json {
        let report = serde_json::json!({
            "text": content,
            "mode": editor.mode().to_string(),
            "pending": editor.pending_keys(),
            "paragraphs": editor.backend().paragraphs().len(),
            "scroll_top": editor.backend().scroll_top(),
            "cursor": cursor,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{content}");
        println!("{}", editor.mode().mode_text());
        match cursor {
            Some(c) => println!(
                "cursor: top={:.1} left={:.1} width={:.1} height={:.1} style={:?}",
                c.top, c.left, c.width, c.height, c.style
            ),
            None => println!("cursor: hidden"),
        }
    }
    Ok(())
}

fn parse_args<I: Iterator<Item = String>>(mut argv: I) -> anyhow::Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--config" => {
                let path = argv.next().context("--config needs a PATH")?;
                args.config = Some(PathBuf::from(path));
            }
            "--keys" => {
                args.keys = argv.next().context("--keys needs a SEQ")?;
            }
            "--json" => args.json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            other => {
                if args.file.is_some() {
                    bail!("more than one FILE given\n{USAGE}");
                }
                args.file = Some(PathBuf::from(other));
            }
        }
    }
    Ok(args)
}

/// Get the config file path (~/.config/damai/config.toml).
fn dirs_config_path() -> PathBuf {
    dirs_home().join(".config").join("damai").join("config.toml")
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
