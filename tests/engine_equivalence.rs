//! Property test: FAST, SAFE, and DISK must agree on the duplicate entries
//! they report for the same corpus (Universal invariant — the three engines
//! are an implementation-strategy choice, never an observable difference).

use std::fs;
use std::path::Path;

use proptest::prelude::*;

use duplicate_finder_core::config::Config;
use duplicate_finder_core::context::RunContext;
use duplicate_finder_core::engine::{disk, fast, safe_engine};
use duplicate_finder_core::model::{DuplicateEntry, FileId, InputFile};

fn record_field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,6}"
}

fn record_line() -> impl Strategy<Value = String> {
    (record_field(), record_field(), record_field())
        .prop_map(|(a, b, c)| format!("{a};{b};{c}"))
}

fn corpus() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(record_line(), 1..6), 2..4)
}

fn write_corpus(dir: &Path, corpus: &[Vec<String>]) -> Vec<InputFile> {
    let mut files: Vec<InputFile> = corpus
        .iter()
        .enumerate()
        .map(|(i, lines)| {
            let basename = format!("f{i}.csv");
            let path = dir.join(&basename);
            let mut contents = String::from("header\n");
            for line in lines {
                contents.push_str(line);
                contents.push('\n');
            }
            fs::write(&path, &contents).unwrap();
            InputFile {
                id: FileId(0),
                path,
                basename,
                size: contents.len() as u64,
            }
        })
        .collect();

    // Assign FileId the same way `fileset::enumerate_input_files` does:
    // ascending size, basename tiebreak.
    files.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.basename.cmp(&b.basename)));
    for (i, f) in files.iter_mut().enumerate() {
        f.id = FileId(i as u32);
    }
    files
}

fn sorted_report(entries: &[DuplicateEntry]) -> Vec<(String, Vec<String>)> {
    let mut out: Vec<(String, Vec<String>)> = entries.iter().map(|e| (e.prefix.clone(), e.basenames.clone())).collect();
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fast_safe_disk_report_the_same_duplicates(corpus in corpus()) {
        let dir = tempfile::tempdir().unwrap();
        let files = write_corpus(dir.path(), &corpus);

        let mut config = Config::default();
        config.temp_dir = dir.path().join("temp_duplicate_finder");
        let ctx = RunContext::new(config, chrono::Local::now());

        let fast_out = fast::run(&files, &ctx);
        let safe_out = safe_engine::run(&files, &ctx);
        let disk_out = disk::run(&files, &ctx).unwrap();

        let fast_report = sorted_report(&fast_out.entries);
        prop_assert_eq!(&fast_report, &sorted_report(&safe_out.entries));
        prop_assert_eq!(&fast_report, &sorted_report(&disk_out.entries));
    }
}
