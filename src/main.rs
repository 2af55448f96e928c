use env_logger::Env;
use songsheet::{RenderOptions, RenderedSong};
use std::env;
use std::fs;
use std::process;

const USAGE: &str = "Usage: songsheet <song.txt> [--key K] [--config options.yaml] [--view raw|chords|lyrics|stacked|json|summary]
       songsheet --merge <chart.txt>";

fn init_logging() {
    env_logger::Builder::from_env(Env::new().filter_or("SONGSHEET_LOG", "warn"))
        .format_timestamp(None)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum View {
    Raw,
    Chords,
    Lyrics,
    Stacked,
    Json,
    Summary,
}

impl View {
    fn parse(name: &str) -> Option<View> {
        match name {
            "raw" => Some(View::Raw),
            "chords" => Some(View::Chords),
            "lyrics" => Some(View::Lyrics),
            "stacked" => Some(View::Stacked),
            "json" => Some(View::Json),
            "summary" => Some(View::Summary),
            _ => None,
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(format!("Error reading file '{}': {}", path, e)),
    }
}

fn format_text(song: &RenderedSong, view: View) -> String {
    let mut out = Vec::new();
    for (i, section) in song.sections.iter().enumerate() {
        if i > 0 {
            out.push(String::new());
        }
        if !section.title.is_empty() {
            out.push(format!("[{}]", section.title));
        }
        for line in &section.lines {
            match view {
                View::Raw => out.push(line.raw.clone()),
                View::Chords => out.push(line.chorded.clone()),
                View::Lyrics => out.push(line.lyrics.clone()),
                _ => {
                    if !line.stacked.chords.is_empty() {
                        out.push(line.stacked.chords.clone());
                    }
                    out.push(line.stacked.lyrics.clone());
                }
            }
        }
    }
    out.join("\n")
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        fail(USAGE);
    }

    if args[1] == "--merge" {
        let path = args.get(2).unwrap_or_else(|| fail(USAGE));
        println!("{}", songsheet::merge_document(&read_file(path)));
        return;
    }

    let input_path = &args[1];
    let mut options = RenderOptions::default();
    let mut target_key: Option<&String> = None;
    let mut view = View::Stacked;

    // Parse flags
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let value = rest.next().unwrap_or_else(|| fail(USAGE));
        match flag.as_str() {
            "--key" => target_key = Some(value),
            "--config" => {
                options = match RenderOptions::from_yaml(&read_file(value)) {
                    Ok(options) => options,
                    Err(e) => fail(format!("Error in '{}': {}", value, e)),
                }
            }
            "--view" => {
                view = View::parse(value)
                    .unwrap_or_else(|| fail(format!("Unknown view '{}'\n{}", value, USAGE)))
            }
            _ => fail(format!("Unknown option '{}'\n{}", flag, USAGE)),
        }
    }
    // --key wins over the config file
    if let Some(key) = target_key {
        options.target_key = Some(key.clone());
    }

    let source = read_file(input_path);

    if view == View::Summary {
        let summary = songsheet::summarize_song(&source);
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("Error writing summary: {}", e)),
        }
        return;
    }

    let song = match songsheet::render_song(&source, &options) {
        Ok(song) => song,
        Err(e) => fail(format!("Error: {}", e)),
    };

    match view {
        View::Json => match serde_json::to_string_pretty(&song) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("Error writing JSON: {}", e)),
        },
        _ => println!("{}", format_text(&song, view)),
    }
}
