//! Unit tests for the `formatki` CLI entrypoint module.

use super::{
    canonical_token, download_target, explicit_server_override, format_list_output,
    resolve_server, resolve_timeout, save_download,
};
use super::{Cli, Commands};
use clap::Parser;
use formatki_core::constants::DEFAULT_GENERATED_FILENAME;
use formatki_core::Config;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn config(pairs: &[(&str, &str)]) -> Config {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| map.get(key).cloned())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn cli_parses_generate_with_repeated_codes() {
    let cli = Cli::try_parse_from([
        "formatki",
        "generate",
        "--category",
        "Ogród",
        "--gt",
        "10 Rośliny",
        "--gt",
        "20 Narzędzia",
        "--kw-paste",
        "Byliny; Krzewy",
        "--email",
        "a@obi.pl",
        "--trace-render",
    ])
    .expect("cli should parse generate");
    match cli.command {
        Commands::Generate {
            category,
            gt,
            gt_paste,
            kw,
            kw_paste,
            email,
            download_dir,
            trace_render,
        } => {
            assert_eq!(category, "Ogród");
            assert_eq!(gt, strings(&["10 Rośliny", "20 Narzędzia"]));
            assert!(gt_paste.is_none());
            assert!(kw.is_empty());
            assert_eq!(kw_paste.as_deref(), Some("Byliny; Krzewy"));
            assert_eq!(email.as_deref(), Some("a@obi.pl"));
            assert!(download_dir.is_none());
            assert!(trace_render);
        }
        _ => panic!("expected generate command"),
    }
}

#[test]
fn cli_generate_requires_a_category() {
    assert!(Cli::try_parse_from(["formatki", "generate", "--gt", "10"]).is_err());
}

#[test]
fn cli_kw_requires_at_least_one_gt() {
    assert!(Cli::try_parse_from(["formatki", "kw"]).is_err());
    let cli = Cli::try_parse_from(["formatki", "kw", "10", "20"]).expect("cli should parse kw");
    match cli.command {
        Commands::Kw { gt } => assert_eq!(gt, strings(&["10", "20"])),
        _ => panic!("expected kw command"),
    }
}

#[test]
fn cli_json_flag_is_global() {
    let cli = Cli::try_parse_from(["formatki", "gt", "Ogród", "--json", "-f", "narz"])
        .expect("cli should parse gt");
    assert!(cli.json);
    match cli.command {
        Commands::Gt { category, filter } => {
            assert_eq!(category, "Ogród");
            assert_eq!(filter.as_deref(), Some("narz"));
        }
        _ => panic!("expected gt command"),
    }
}

#[test]
fn explicit_server_beats_config() {
    let config = config(&[("FORMATKI_SERVER", "http://10.0.0.2:5000")]);
    assert_eq!(
        resolve_server(Some("http://127.0.0.1:6000".to_string()), &config),
        "http://127.0.0.1:6000"
    );
    assert_eq!(resolve_server(None, &config), "http://10.0.0.2:5000");
}

#[test]
fn blank_server_override_is_absent() {
    assert_eq!(explicit_server_override(Some("   ".to_string())), None);
    let config = config(&[]);
    assert_eq!(
        resolve_server(Some(" ".to_string()), &config),
        formatki_core::DEFAULT_SERVER_URL
    );
}

#[test]
fn zero_timeout_falls_back_to_config() {
    let config = config(&[("FORMATKI_TIMEOUT_SECS", "12")]);
    assert_eq!(resolve_timeout(Some(0), &config), 12);
    assert_eq!(resolve_timeout(Some(5), &config), 5);
    assert_eq!(resolve_timeout(None, &config), 12);
}

#[test]
fn canonical_token_matches_case_insensitively() {
    let available = strings(&["10 Rośliny", "20 Narzędzia"]);
    assert_eq!(
        canonical_token(&available, " 10 ROŚLINY "),
        Some("10 Rośliny".to_string())
    );
    assert_eq!(canonical_token(&available, "30"), None);
}

#[test]
fn list_output_is_lines_or_json_array() {
    let items = strings(&["Ogród", "Oświetlenie"]);
    assert_eq!(
        format_list_output(&items, false).expect("plain output"),
        "Ogród\nOświetlenie"
    );
    let rendered = format_list_output(&items, true).expect("json output");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(parsed[1], "Oświetlenie");
}

#[test]
fn download_target_strips_directories_from_label() {
    let dir = Path::new("/tmp/out");
    assert_eq!(
        download_target(dir, "../../etc/ogrod.xlsx"),
        dir.join("ogrod.xlsx")
    );
    assert_eq!(download_target(dir, ""), dir.join(DEFAULT_GENERATED_FILENAME));
}

#[test]
fn save_download_creates_directory_and_writes_bytes() {
    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path().join("nested");
    let path = save_download(&dir, "ogrod.xlsx", b"PK\x03\x04").expect("save");
    assert_eq!(path, dir.join("ogrod.xlsx"));
    assert_eq!(std::fs::read(path).expect("read back"), b"PK\x03\x04");
}
