//! Loading snippet directories from disk
//!
//! These tests write real snippet files into a temporary directory and check
//! load order, merging and the degraded paths.

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taikou_snippets::{
    complete_line, load_snippet_dir, query, SnippetConfig, SnippetStore, SnippetWatcher,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("Failed to write snippet file");
}

/// Poll `check` until it holds or a few seconds pass.
fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    check()
}

#[test]
fn test_keywords_file_loads_before_others() {
    let dir = TempDir::new().unwrap();
    write(&dir, "zzz.snippet", "#t=Call foo later\n#g=f2\nfoo()\n");
    write(&dir, "keywords.snippet", "#t=Call foo\n#g=f1\nfoo()\n");

    let index = load_snippet_dir(&SnippetConfig::new(dir.path()));

    assert_eq!(index.len(), 1);
    let entry = index.get("foo()").unwrap();
    assert_eq!(entry.label, "Call foo");
    assert_eq!(entry.sort_index, 0);
    let triggers: Vec<&str> = entry.triggers.iter().map(String::as_str).collect();
    assert_eq!(triggers, vec!["f1", "f2"]);
}

#[test]
fn test_only_snippet_files_are_read() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");
    write(&dir, "notes.txt", "#t=B\n#g=b\nbeta\n");
    write(&dir, "a.snippet.bak", "#t=C\n#g=c\ngamma\n");

    let index = load_snippet_dir(&SnippetConfig::new(dir.path()));
    assert_eq!(index.len(), 1);
    assert!(index.get("alpha").is_some());
}

#[test]
fn test_unreadable_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(&dir, "good.snippet", "#t=A\n#g=a\nalpha\n");
    // Not valid UTF-8
    fs::write(dir.path().join("bad.snippet"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    // A directory with a matching name cannot be read as a file
    fs::create_dir(dir.path().join("nested.snippet")).unwrap();

    let index = load_snippet_dir(&SnippetConfig::new(dir.path()));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_missing_directory_gives_no_candidates() {
    let dir = TempDir::new().unwrap();
    let config = SnippetConfig::new(dir.path().join("everedit"));

    let index = load_snippet_dir(&config);
    assert_eq!(index.len(), 0);
    assert!(query(&index, "").is_empty());
    assert!(complete_line(&index, "").candidates.is_empty());
}

#[test]
fn test_rebuild_twice_is_stable() {
    let dir = TempDir::new().unwrap();
    write(&dir, "fast.snippet", "#t=Wait\n#g=w\nWait($1)\n#t=Say\n#g=s\nSay($1)\n");
    write(&dir, "b.snippet", "#t=End\n#g=e\nEnd()\n#t=Wait again\n#g=wt\nWait($1)\n");
    write(&dir, "a_script.snippet", "#t=Jump\n#g=j\nJump($1)\n");

    let config = SnippetConfig::new(dir.path());
    let first = load_snippet_dir(&config);
    let second = load_snippet_dir(&config);

    let ranks = |index: &taikou_snippets::SnippetIndex| {
        index
            .entries()
            .map(|e| (e.body.clone(), e.sort_index))
            .collect::<Vec<_>>()
    };
    assert_eq!(ranks(&first), ranks(&second));
    assert_eq!(
        ranks(&first),
        vec![
            ("Wait($1)".to_string(), 0),
            ("Say($1)".to_string(), 1),
            ("Jump($1)".to_string(), 2),
            ("End()".to_string(), 3),
        ]
    );
}

#[test]
fn test_custom_extension_and_order() {
    let dir = TempDir::new().unwrap();
    write(&dir, "alpha.tks", "#t=A\n#g=a\nalpha\n");
    write(&dir, "beta.tks", "#t=B\n#g=b\nbeta\n");

    let mut config = SnippetConfig::new(dir.path());
    config.extension = ".tks".to_string();
    config.load_order = vec!["beta".to_string()];

    let index = load_snippet_dir(&config);
    assert_eq!(index.get("beta").unwrap().sort_index, 0);
    assert_eq!(index.get("alpha").unwrap().sort_index, 1);
}

#[test]
fn test_store_rebuild_picks_up_changes() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");

    let store = Arc::new(SnippetStore::new(SnippetConfig::new(dir.path())));
    assert_eq!(store.rebuild(), 1);

    let before = store.snapshot();
    write(&dir, "b.snippet", "#t=B\n#g=b\nbeta\n");
    assert_eq!(store.rebuild(), 2);

    assert_eq!(before.len(), 1);
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn test_body_round_trips_from_disk() {
    let dir = TempDir::new().unwrap();
    let body = "If($1)\n\n\tMessage(\"$2\")  \n\nEndIf()";
    write(&dir, "a.snippet", &format!("#t=If\n#g=if\n{body}\n\n  \n"));

    let index = load_snippet_dir(&SnippetConfig::new(dir.path()));
    assert_eq!(index.get(body).unwrap().body, body);
}

#[cfg(unix)]
#[test]
fn test_dangling_link_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("b.snippet")).unwrap();

    let index = load_snippet_dir(&SnippetConfig::new(dir.path()));
    assert_eq!(index.len(), 1);
    assert!(index.get("alpha").is_some());
}

/// A rebuild that starts while another is still reading must publish after it.
#[cfg(unix)]
#[test]
fn test_later_rebuild_is_published_last() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");
    let fifo = dir.path().join("slow.snippet");
    let status = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .expect("mkfifo available");
    assert!(status.success());

    let store = Arc::new(SnippetStore::new(SnippetConfig::new(dir.path())));

    // First rebuild blocks opening the fifo until a writer shows up
    let first = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.rebuild())
    };
    thread::sleep(Duration::from_millis(200));

    let second = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.rebuild())
    };
    thread::sleep(Duration::from_millis(100));

    // Stale content for the first reader, nothing for the second
    fs::write(&fifo, "#t=Old\n#g=old\nold()\n").unwrap();
    assert_eq!(first.join().unwrap(), 2);
    fs::write(&fifo, "").unwrap();
    assert_eq!(second.join().unwrap(), 1);

    let index = store.snapshot();
    assert!(index.get("old()").is_none());
    assert!(index.get("alpha").is_some());
    assert_eq!(store.generation(), 2);
}

#[test]
fn test_watcher_reloads_on_add_and_remove() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");

    let store = Arc::new(SnippetStore::new(SnippetConfig::new(dir.path())));
    assert_eq!(store.rebuild(), 1);
    let _watcher =
        SnippetWatcher::spawn_with_debounce(Arc::clone(&store), Duration::from_millis(50))
            .unwrap();

    write(&dir, "b.snippet", "#t=B\n#g=b\nbeta\n");
    assert!(wait_for(|| store.snapshot().len() == 2), "added file not picked up");

    fs::remove_file(dir.path().join("b.snippet")).unwrap();
    assert!(wait_for(|| store.snapshot().len() == 1), "removed file still indexed");
    assert!(store.snapshot().get("beta").is_none());
}

#[test]
fn test_watcher_ignores_other_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.snippet", "#t=A\n#g=a\nalpha\n");

    let store = Arc::new(SnippetStore::new(SnippetConfig::new(dir.path())));
    store.rebuild();
    let _watcher =
        SnippetWatcher::spawn_with_debounce(Arc::clone(&store), Duration::from_millis(50))
            .unwrap();
    let generation = store.generation();

    write(&dir, "notes.txt", "#t=B\n#g=b\nbeta\n");
    thread::sleep(Duration::from_millis(500));

    assert_eq!(store.generation(), generation);
    assert_eq!(store.snapshot().len(), 1);
}
