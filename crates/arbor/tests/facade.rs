#![forbid(unsafe_code)]

//! Facade smoke tests: a store built from env-style configuration over
//! local payloads, driven through the prelude types.

#![cfg(feature = "runtime")]

use std::time::{Duration, Instant};

use arbor::prelude::*;
use arbor::{
    ConfigError, DispatchOutcome, FetchError, Transport, TransportResponse, TreeViewState,
};

fn write_payloads(dir: &std::path::Path) {
    std::fs::write(
        dir.join("data.json"),
        r#"[
            {"id": "docs", "label": "Docs", "children": [
                {"id": "intro", "label": "Intro", "children": []},
                {"id": "guide", "label": "Guide"}
            ]},
            {"id": "notes", "label": "Notes", "children": []}
        ]"#,
    )
    .unwrap();
    std::fs::create_dir(dir.join("entries")).unwrap();
    std::fs::write(
        dir.join("entries").join("intro.json"),
        r#"{"description": "Start here"}"#,
    )
    .unwrap();
}

/// Apply results as they arrive until `done` holds or five seconds pass.
fn pump_until(
    program: &mut Program<TreeStore<()>>,
    done: impl Fn(&TreeStore<()>) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        program.pump();
        if done(program.model()) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn env_configured_store_loads_and_moves() {
    let dir = tempfile::tempdir().unwrap();
    write_payloads(dir.path());
    let tree_url = format!("file://{}", dir.path().join("data.json").display());
    let entry_url = format!("file://{}/", dir.path().join("entries").display());

    let store: TreeStore<()> = arbor::store_from_lookup(|var| match var {
        "ARBOR_TREE_DATA_URL" => Some(tree_url.clone()),
        "ARBOR_ENTRY_DATA_URL" => Some(entry_url.clone()),
        "ARBOR_LEAF_ERROR_TTL_MS" => Some("60000".to_string()),
        _ => None,
    })
    .unwrap();

    let mut program = Program::new(store);
    program.init();
    assert!(program.run_until_idle(Duration::from_secs(5)));
    assert_eq!(program.model().view_state(), TreeViewState::Ready);

    program.send(TreeMsg::Dispatch(TreeAction::instruction(
        "notes",
        "guide",
        Instruction::Reparent { desired_level: 0 },
    )));
    let roots: Vec<&str> = program.model().tree().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(roots, vec!["docs", "notes"]);

    program.send(TreeMsg::Dispatch(TreeAction::instruction(
        "notes",
        "intro",
        Instruction::ReorderBelow,
    )));
    assert_eq!(
        program.model().path_to_item("notes"),
        Some(vec!["docs".to_string()])
    );

    program.send(TreeMsg::FetchLeaf("intro".into()));
    assert!(program.run_until_idle(Duration::from_secs(5)));
    assert_eq!(
        program.model().open_leaf().map(|l| l.description.as_str()),
        Some("Start here")
    );

    program.send(TreeMsg::FetchLeaf("guide".into()));
    assert!(pump_until(&mut program, |store| store.leaf_error().is_some()));
    assert_eq!(
        program.model().leaf_error().map(|e| e.message.as_str()),
        Some("Error fetching entry guide: Not Found")
    );
    // The clear timer is still outstanding.
    assert_eq!(program.pending(), 1);
}

#[test]
fn unset_urls_are_rejected_for_file_payloads() {
    let err = arbor::store_from_lookup::<()>(|_| None).unwrap_err();
    match err {
        Error::Config(ConfigError::UnsupportedUrl { var, url }) => {
            assert_eq!(var, "ARBOR_TREE_DATA_URL");
            assert!(url.starts_with("https://"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Serves fixed payloads for any URL ending in a known file name.
struct CannedTransport;

impl Transport for CannedTransport {
    fn get(&self, url: &str) -> std::result::Result<TransportResponse, FetchError> {
        if url.ends_with("/data.json") {
            Ok(TransportResponse::ok(r#"[{"label": "Root", "children": []}]"#))
        } else {
            Ok(TransportResponse::with_status(404, "Not Found"))
        }
    }
}

#[test]
fn default_urls_load_through_custom_transport() {
    let store: TreeStore<()> = arbor::store_with_transport(CannedTransport, |_| None).unwrap();
    let mut program = Program::new(store);
    program.init();
    assert!(program.run_until_idle(Duration::from_secs(5)));
    assert_eq!(program.model().view_state(), TreeViewState::Ready);
    let labels: Vec<&str> = program.model().tree().iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["Root"]);
    assert!(!program.model().tree()[0].id.is_empty());
}

#[test]
fn pure_dispatch_reports_outcome() {
    let tree = vec![TreeNode::new("a", "A").child(TreeNode::new("b", "B"))];
    let result = arbor::dispatch(
        &tree,
        &TreeAction::instruction("a", "b", Instruction::MakeChild),
    );
    assert_eq!(result.outcome, DispatchOutcome::TargetInsideItem);
    assert_eq!(result.tree, tree);
}
