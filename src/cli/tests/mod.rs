//! Unit tests for CLI module
//!
//! Tests the command registry, help output and every built-in command
//! against an in-memory state store.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::{
    cli::{
        CliError, CliService, Command, CommandMetadata, CommandRegistry, CommandResult,
        formatting::{format_playing, format_timestamp},
    },
    services::video::{
        ErrorMetrics, ErrorSnapshot, PlayerError, PlayerId, PlayerMetadata,
        persistence::{MemoryStateStore, PersistedSnapshot, StateStore},
    },
};

fn seeded_store() -> Arc<MemoryStateStore> {
    let mut snapshot = PersistedSnapshot::empty("Videos");
    snapshot.players_meta.insert(
        PlayerId::from("feed-1"),
        PlayerMetadata {
            is_playing: true,
            ..PlayerMetadata::default()
        },
    );
    snapshot.players_meta.insert(
        PlayerId::from("story-1"),
        PlayerMetadata {
            recovery_attempts: 3,
            last_error: Some(ErrorSnapshot::capture(&PlayerError::Other(
                "decoder wedged".to_string(),
            ))),
            ..PlayerMetadata::default()
        },
    );
    snapshot.error_metrics = ErrorMetrics {
        disposal_errors: 2,
        recovery_successes: 1,
        recovery_failures: 3,
        total_errors: 5,
    };

    Arc::new(MemoryStateStore::with_contents(snapshot.encode().unwrap()))
}

fn service(store: &Arc<MemoryStateStore>) -> CliService {
    CliService::new(store.clone())
}

fn run(service: &CliService, category: &str, command: &str, args: &[&str]) -> CommandResult {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    service.execute_command(category, command, &args)
}

#[test]
fn command_registry_creation() {
    let registry = CommandRegistry::new(Arc::new(MemoryStateStore::new()));

    assert!(registry.list_commands().is_empty());
}

#[test]
fn command_registry_categories() {
    let mut registry = CommandRegistry::new(Arc::new(MemoryStateStore::new()));
    registry.register_all_commands();

    let commands = registry.list_commands();
    let categories: Vec<&str> = commands.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(categories, vec!["metrics", "players", "state"]);

    let state = &commands[2].1;
    assert_eq!(state, &vec!["clear", "path", "show"]);
}

struct EchoCommand;

impl Command for EchoCommand {
    fn execute(&self, args: &[String]) -> CommandResult {
        Ok(args.join(" "))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "echo".to_string(),
            description: "Echo arguments".to_string(),
            args: vec![crate::cli::CommandArg {
                name: "text".to_string(),
                description: "Text to echo".to_string(),
                required: true,
                value_type: crate::cli::ArgType::String,
            }],
            examples: Vec::new(),
            category: "debug".to_string(),
        }
    }
}

#[test]
fn registry_validates_argument_count() {
    let mut registry = CommandRegistry::new(Arc::new(MemoryStateStore::new()));
    registry.register_command("debug", Box::new(EchoCommand));

    assert!(matches!(
        registry.execute("debug", "echo", &[]),
        Err(CliError::InvalidArguments(_))
    ));
    assert!(matches!(
        registry.execute("debug", "echo", &["a".to_string(), "b".to_string()]),
        Err(CliError::InvalidArguments(_))
    ));
    assert_eq!(
        registry.execute("debug", "echo", &["hi".to_string()]).unwrap(),
        "hi"
    );
}

#[test]
fn unknown_category_and_command_are_reported() {
    let store = seeded_store();
    let service = service(&store);

    assert!(matches!(
        run(&service, "audio", "show", &[]),
        Err(CliError::CommandNotFound(_))
    ));
    assert!(matches!(
        run(&service, "state", "explode", &[]),
        Err(CliError::CommandNotFound(_))
    ));
    assert!(matches!(
        run(&service, "audio", "", &[]),
        Err(CliError::CommandNotFound(_))
    ));
}

#[test]
fn help_lists_every_category() {
    let store = seeded_store();
    let service = service(&store);

    let help = run(&service, "help", "", &[]).unwrap();
    for expected in ["state", "metrics", "players", "reset", "list"] {
        assert!(help.contains(expected), "help is missing {expected}");
    }

    let category_help = run(&service, "metrics", "", &[]).unwrap();
    assert!(category_help.contains("reelguard metrics reset"));
    assert!(!category_help.contains("players list"));
}

#[test]
fn state_show_summarizes_snapshot() {
    let store = seeded_store();
    let output = run(&service(&store), "state", "show", &[]).unwrap();

    assert!(output.contains("current tab: Videos"));
    assert!(output.contains("players: 2 (1 playing)"));
    assert!(output.contains("total errors: 5"));
}

#[test]
fn state_show_raw_prints_json() {
    let store = seeded_store();
    let output = run(&service(&store), "state", "show", &["true"]).unwrap();

    let parsed = PersistedSnapshot::decode(&output).unwrap();
    assert_eq!(parsed.players_meta.len(), 2);
}

#[test]
fn state_show_on_empty_store() {
    let store = Arc::new(MemoryStateStore::new());
    let output = run(&service(&store), "state", "show", &[]).unwrap();

    assert!(output.contains("current tab: -"));
    assert!(output.contains("players: 0 (0 playing)"));
}

#[test]
fn state_show_reports_invalid_state() {
    let store = Arc::new(MemoryStateStore::with_contents(r#"{ "version": 99 }"#));

    assert!(matches!(
        run(&service(&store), "state", "show", &[]),
        Err(CliError::StateError(_))
    ));
}

#[test]
fn state_path_and_clear() {
    let store = seeded_store();
    let service = service(&store);

    assert_eq!(run(&service, "state", "path", &[]).unwrap(), "memory");

    run(&service, "state", "clear", &[]).unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn metrics_show_and_reset() {
    let store = seeded_store();
    let service = service(&store);

    let shown = run(&service, "metrics", "show", &[]).unwrap();
    assert!(shown.contains("disposal errors:    2"));
    assert!(shown.contains("recovery failures:  3"));

    run(&service, "metrics", "reset", &[]).unwrap();

    let saved = PersistedSnapshot::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(saved.error_metrics, ErrorMetrics::default());
    assert_eq!(saved.players_meta.len(), 2, "reset keeps player metadata");
}

#[test]
fn players_list_renders_metadata() {
    let store = seeded_store();
    let service = service(&store);

    let listed = run(&service, "players", "list", &[]).unwrap();
    let lines: Vec<&str> = listed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("feed-1: playing recoveries=0"));
    assert!(lines[1].starts_with("story-1: paused recoveries=3"));
    assert!(lines[1].contains("last_error=UNKNOWN_ERROR"));

    let filtered = run(&service, "players", "list", &["story"]).unwrap();
    assert!(filtered.starts_with("story-1"));
    assert!(!filtered.contains("feed-1"));

    let empty = run(&service, "players", "list", &["nothing"]).unwrap();
    assert_eq!(empty, "No players recorded");
}

#[test]
fn formatting_helpers() {
    assert_eq!(format_timestamp(None), "-");
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(format_timestamp(Some(at)), "2026-03-01 12:30:00 UTC");
    assert_eq!(format_playing(true), "playing");
    assert_eq!(format_playing(false), "paused");
}
