use std::io::Read;

use serde::Serialize;
use writing_tools::models::AnalysisResult;
use writing_tools::services::detection::{classify, highlight_matches};
use writing_tools::services::text_processor::{detect_language, normalize_punctuation, preview, word_count};

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("read file failed: {}: {}", path, e))
}

fn main() -> anyhow::Result<()> {
    writing_tools::init_console_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  classify_text <path|-> [--highlight] [--out <json_path>]\n\nRuns the local heuristic classifier only; no API key is needed."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let show_highlight = has_flag(&args, "--highlight");
    let out_path = parse_arg_value(&args, "--out");

    let text = normalize_punctuation(&read_input(&path)?);
    let language = detect_language(&text);
    let analysis = classify(&text);

    println!("Input: {}", path);
    println!("Words: {}  Language: {}", word_count(&text), language);
    println!(
        "Overall: {}  AI-generated: {}%  AI-refined: {}%  Human: {}%",
        analysis.overall_score, analysis.ai_generated, analysis.ai_refined, analysis.human_written
    );
    let d = analysis.detailed_analysis;
    println!(
        "Vocabulary: {}  Syntax: {}  Coherence: {}  Creativity: {}",
        d.vocabulary, d.syntax, d.coherence, d.creativity
    );
    println!();

    for (i, s) in analysis.sentences.iter().enumerate() {
        println!(
            "[S{:02}] {:>3}%{} {}{}",
            i,
            s.ai_probability,
            if s.highlighted { " *" } else { "  " },
            preview(&s.text, 100),
            if s.patterns.is_empty() {
                String::new()
            } else {
                format!("  [{}]", s.patterns.join(", "))
            }
        );
    }

    let highlighted = highlight_matches(&text, &analysis.sentences);
    if show_highlight {
        println!();
        println!("{}", highlighted);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output<'a> {
            file: &'a str,
            language: &'a str,
            word_count: usize,
            #[serde(flatten)]
            analysis: &'a AnalysisResult,
            highlighted_text: &'a str,
        }

        let out = Output {
            file: &path,
            language: &language,
            word_count: word_count(&text),
            analysis: &analysis,
            highlighted_text: &highlighted,
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(&out_path, json).map_err(|e| anyhow::anyhow!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
