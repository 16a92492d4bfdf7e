use super::*;
use serde_json::json;

fn scratch(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit-batch")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(dir.join("layouts")).unwrap();
    dir
}

fn write_layout(dir: &Path, file: &str, name: &str, color: &str) {
    let doc = json!({
        "name": name,
        "supportedSizes": [{"id": "small", "width": 110, "height": 110}],
        "layout": {"type": "label", "text": "item.temperature", "color": color},
    });
    std::fs::write(dir.join(file), serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

fn run(dir: &Path, batch: &BatchOptions) -> WidgetResult<BatchReport> {
    generate_batch(
        &dir.join("layouts"),
        &dir.join("out"),
        &StyleConfig::builtin(),
        &GeneratorOptions::default(),
        batch,
    )
}

#[test]
fn failing_widget_does_not_stop_its_siblings() {
    let dir = scratch("isolation");
    write_layout(&dir.join("layouts"), "Bad.json", "Bad", "not-a-color");
    write_layout(&dir.join("layouts"), "Good.json", "Good", "@primary");

    let report = run(&dir, &BatchOptions::default()).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].widget, "Bad");
    assert_eq!(report.outcomes[1].widget, "Good");

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let (name, err) = failures[0];
    assert_eq!(name, "Bad");
    assert!(matches!(err, WidgetError::Widget { widget, .. } if widget == "Bad"));
    assert!(matches!(err.root(), WidgetError::InvalidColor { .. }));

    assert_eq!(report.written(), 2);
    let out = dir.join("out");
    assert!(out.join("glance/GoodContent.generated.kt").is_file());
    assert!(out.join("swiftui/GoodView.generated.swift").is_file());
    assert!(!out.join("glance/BadContent.generated.kt").exists());
    assert!(!out.join("swiftui/BadView.generated.swift").exists());
}

#[test]
fn rerun_leaves_identical_files_alone() {
    let dir = scratch("rerun");
    write_layout(&dir.join("layouts"), "Good.json", "Good", "@primary");

    let first = run(&dir, &BatchOptions::default()).unwrap();
    assert_eq!((first.written(), first.unchanged()), (2, 0));
    let second = run(&dir, &BatchOptions::default()).unwrap();
    assert_eq!((second.written(), second.unchanged()), (0, 2));
    assert!(second.is_success());
}

#[test]
fn widget_filter_and_platform_selection() {
    let dir = scratch("filter");
    write_layout(&dir.join("layouts"), "A.json", "Alpha", "red");
    write_layout(&dir.join("layouts"), "B.json", "Beta", "red");

    let batch = BatchOptions {
        platforms: vec![CompiledPlatform::SwiftUi],
        widgets: vec!["Beta".to_string()],
        jobs: Some(1),
    };
    let report = run(&dir, &batch).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].widget, "Beta");
    let files = report.outcomes[0].result.as_ref().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].platform, CompiledPlatform::SwiftUi);
    assert!(files[0].path.ends_with("swiftui/BetaView.generated.swift"));
    assert!(!dir.join("out").join("glance").exists());
}

#[test]
fn requested_widget_without_layout_fails() {
    let dir = scratch("unmatched");
    write_layout(&dir.join("layouts"), "A.json", "Alpha", "red");

    let batch = BatchOptions {
        widgets: vec!["Alpha".to_string(), "Nope".to_string()],
        ..BatchOptions::default()
    };
    let report = run(&dir, &batch).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].result.is_ok());
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    let (name, err) = failures[0];
    assert_eq!(name, "Nope");
    assert!(matches!(err.root(), WidgetError::Config(msg) if msg.contains("'Nope'")));

    let only_missing = BatchOptions {
        widgets: vec!["Nope".to_string()],
        ..BatchOptions::default()
    };
    let report = run(&dir, &only_missing).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.is_success());
}

#[test]
fn duplicate_widget_names_fail_every_declaring_file() {
    let dir = scratch("duplicates");
    let layouts = dir.join("layouts");
    std::fs::create_dir_all(layouts.join("x")).unwrap();
    write_layout(&layouts, "A.json", "Same", "red");
    write_layout(&layouts.join("x"), "B.json", "Same", "blue");
    write_layout(&layouts, "C.json", "Other", "red");

    let report = run(&dir, &BatchOptions::default()).unwrap();
    assert_eq!(report.outcomes.len(), 3);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 2);
    for (name, err) in failures {
        assert_eq!(name, "Same");
        assert_eq!(err.path(), Some("$.name"));
        assert!(err.to_string().contains("A.json"));
        assert!(err.to_string().contains("B.json"));
    }
    let out = dir.join("out");
    assert!(!out.join("glance/SameContent.generated.kt").exists());
    assert!(out.join("glance/OtherContent.generated.kt").is_file());
}

#[test]
fn unparseable_layout_is_reported_under_its_file_stem() {
    let dir = scratch("unparseable");
    std::fs::write(dir.join("layouts").join("Broken.json"), "{ not json").unwrap();
    write_layout(&dir.join("layouts"), "Good.json", "Good", "red");

    let report = run(&dir, &BatchOptions::default()).unwrap();
    assert_eq!(report.outcomes.len(), 2);
    let broken = &report.outcomes[0];
    assert_eq!(broken.widget, "Broken");
    let err = broken.result.as_ref().unwrap_err();
    assert!(matches!(err.root(), WidgetError::Schema { .. }));
    assert!(report.outcomes[1].result.is_ok());
}

#[test]
fn zero_jobs_is_a_config_error() {
    let dir = scratch("jobs");
    let batch = BatchOptions {
        jobs: Some(0),
        ..BatchOptions::default()
    };
    assert!(matches!(run(&dir, &batch), Err(WidgetError::Config(_))));
}

#[test]
fn discovery_is_recursive_and_sorted() {
    let dir = scratch("discover");
    let layouts = dir.join("layouts");
    std::fs::create_dir_all(layouts.join("nested")).unwrap();
    write_layout(&layouts, "b.json", "B", "red");
    write_layout(&layouts.join("nested"), "a.json", "A", "red");
    std::fs::write(layouts.join("notes.txt"), "skip").unwrap();

    let found = discover_layouts(&layouts).unwrap();
    assert_eq!(found, vec![layouts.join("b.json"), layouts.join("nested/a.json")]);
}

#[test]
fn write_if_changed_compares_contents() {
    let dir = scratch("write");
    let path = dir.join("file.txt");
    assert_eq!(write_if_changed(&path, "one").unwrap(), WriteStatus::Written);
    assert_eq!(write_if_changed(&path, "one").unwrap(), WriteStatus::Unchanged);
    assert_eq!(write_if_changed(&path, "two").unwrap(), WriteStatus::Written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    assert!(!dir.join(".file.txt.tmp").exists());
}
