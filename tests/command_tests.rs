use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use thread_census::aggregator::MergePolicy;
use thread_census::commands::{
    analyze_cpu, analyze_states, execute_analyze, format_to_toml, validate_args, AnalyzeArgs,
};
use thread_census::output::read_report;
use thread_census::parser::ThreadState;
use thread_census::samples::discover_snapshots;
use thread_census::utils::config::SnapshotFormat;
use thread_census::utils::ConfigError;

fn thread_block(name: &str, nid: &str, state: &str, frames: &[&str]) -> String {
    let mut block = format!(
        "\"{}\" #9 prio=5 os_prio=0 tid=0x00007f0000003000 nid=0x{} waiting on condition\n   java.lang.Thread.State: {}\n",
        name, nid, state
    );
    for frame in frames {
        block.push_str(&format!("\tat {}\n", frame));
    }
    block.push('\n');
    block
}

/// Two dump and two usage snapshots of a small JVM
fn write_samples(dir: &Path) {
    let dump = [
        thread_block("http-exec-1", "123", "RUNNABLE", &["n.Socket.read(Socket.java:1)"]),
        thread_block("pool-1", "7", "WAITING (parking)", &["q.Queue.take(Queue.java:9)"]),
    ]
    .concat();
    fs::write(dir.join("jstack.0001"), &dump).unwrap();
    fs::write(
        dir.join("jstack.0002"),
        format!("Found one Java-level deadlock:\n\n{}", dump),
    )
    .unwrap();

    fs::write(
        dir.join("top.0001"),
        "%CPU %MEM PR S TIME+ TID COMMAND\n50.0 1.0 20 R 0:01 291 java\n30.0 1.0 20 S 0:01 7 java\n0.0 1.0 20 S 0:00 8 java\n",
    )
    .unwrap();
    fs::write(
        dir.join("top.0002"),
        "%CPU %MEM PR S TIME+ TID COMMAND\n10.0 1.0 20 R 0:02 291 java\n20.0 1.0 20 S 0:02 7 java\n",
    )
    .unwrap();

    fs::write(dir.join("README.txt"), "not a snapshot\n").unwrap();
}

fn args_for(dir: &Path) -> AnalyzeArgs {
    AnalyzeArgs {
        samples_dir: dir.to_path_buf(),
        print_report: false,
        ..Default::default()
    }
}

#[test]
fn test_validate_args_valid() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_args(&args_for(dir.path())).is_ok());
}

#[test]
fn test_validate_args_missing_samples_dir() {
    let dir = tempfile::tempdir().unwrap();
    let args = args_for(&dir.path().join("absent"));

    assert!(matches!(
        validate_args(&args),
        Err(ConfigError::SamplesDirMissing(_))
    ));
}

#[test]
fn test_validate_args_samples_path_is_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("jstack.0001");
    fs::write(&file, "").unwrap();

    assert!(matches!(
        validate_args(&args_for(&file)),
        Err(ConfigError::NotADirectory(_))
    ));
}

#[test]
fn test_validate_args_rejects_zero_counts() {
    let dir = tempfile::tempdir().unwrap();

    for args in [
        AnalyzeArgs {
            show_stack_traces: true,
            stack_trace_samples: 0,
            ..args_for(dir.path())
        },
        AnalyzeArgs {
            stack_trace_lines: 0,
            ..args_for(dir.path())
        },
        AnalyzeArgs {
            number_of_threads: 0,
            ..args_for(dir.path())
        },
        AnalyzeArgs {
            width: 0,
            ..args_for(dir.path())
        },
    ] {
        assert!(matches!(
            validate_args(&args),
            Err(ConfigError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_validate_args_sample_count_only_checked_with_stack_traces() {
    let dir = tempfile::tempdir().unwrap();
    let args = AnalyzeArgs {
        stack_trace_samples: 0,
        ..args_for(dir.path())
    };
    assert!(validate_args(&args).is_ok());

    let large = AnalyzeArgs {
        show_stack_traces: true,
        stack_trace_samples: 1_000_000,
        number_of_threads: 10_000_000,
        ..args_for(dir.path())
    };
    assert!(validate_args(&large).is_ok());
}

#[test]
fn test_discovery_orders_and_classifies() {
    let dir = tempfile::tempdir().unwrap();
    write_samples(dir.path());

    let set = discover_snapshots(dir.path(), &SnapshotFormat::default()).unwrap();
    assert_eq!(set.dump_names(), vec!["jstack.0001", "jstack.0002"]);
    assert_eq!(set.usage_names(), vec!["top.0001", "top.0002"]);
}

#[test]
fn test_state_analysis_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_samples(dir.path());
    let format = SnapshotFormat::default();
    let set = discover_snapshots(dir.path(), &format).unwrap();

    let args = AnalyzeArgs {
        show_stack_traces: true,
        stack_trace_samples: 1,
        ..args_for(dir.path())
    };
    let analysis = analyze_states(&set, &args, &format).unwrap();

    assert_eq!(analysis.report.total_records, 4);
    let rows: Vec<(ThreadState, u64, f64)> = analysis
        .report
        .rows
        .iter()
        .map(|r| (r.state, r.count, r.percentage))
        .collect();
    assert_eq!(
        rows,
        vec![
            (ThreadState::Runnable, 2, 50.0),
            (ThreadState::Waiting, 2, 50.0)
        ]
    );
    assert_eq!(analysis.report.rows[0].stack_samples.len(), 1);

    let deadlock = analysis.deadlock.unwrap();
    assert_eq!(deadlock.affected_files, 1);
    assert_eq!(deadlock.last_file, "jstack.0002");
    assert!(!analysis.stacks.is_empty());
}

#[test]
fn test_cpu_analysis_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_samples(dir.path());
    let format = SnapshotFormat::default();
    let set = discover_snapshots(dir.path(), &format).unwrap();

    let args = AnalyzeArgs {
        cpu_usage: true,
        show_stack_traces: true,
        ..args_for(dir.path())
    };
    let report = analyze_cpu(&set, &args, &format).unwrap();

    assert_eq!(report.merge_policy, MergePolicy::Recency);
    let summary: Vec<(u64, &str, &str, f64)> = report
        .threads
        .iter()
        .map(|t| {
            (
                t.thread_id,
                t.thread_id_hex.as_str(),
                t.thread_name.as_str(),
                t.average_cpu,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (291, "123", "http-exec-1", 30.0),
            (7, "7", "pool-1", 25.0)
        ]
    );

    let top = &report.threads[0];
    assert_eq!(top.sample_count, 2);
    assert_eq!(top.stack_samples.len(), 1);
    assert_eq!(top.stack_samples[0].count, 2);
    assert_eq!(top.stack_samples[0].state, Some(ThreadState::Runnable));
}

#[test]
fn test_cpu_analysis_thread_limit() {
    let dir = tempfile::tempdir().unwrap();
    write_samples(dir.path());
    let format = SnapshotFormat::default();
    let set = discover_snapshots(dir.path(), &format).unwrap();

    let args = AnalyzeArgs {
        cpu_usage: true,
        number_of_threads: 1,
        ..args_for(dir.path())
    };
    let report = analyze_cpu(&set, &args, &format).unwrap();

    // One row per usage file: 291 only
    assert_eq!(report.threads.len(), 1);
    assert_eq!(report.threads[0].thread_id, 291);
    assert!(report.threads[0].stack_samples.is_empty());
}

#[test]
fn test_execute_analyze_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_samples(dir.path());
    let out = tempfile::tempdir().unwrap();
    let json_path = out.path().join("report.json");
    let svg_path = out.path().join("states.svg");

    let args = AnalyzeArgs {
        output_json: Some(json_path.clone()),
        output_svg: Some(svg_path.clone()),
        ..args_for(dir.path())
    };
    let report = execute_analyze(args).unwrap();

    assert!(report.cpu_report.is_none());
    assert_eq!(report.dump_files, vec!["jstack.0001", "jstack.0002"]);
    assert_eq!(read_report(&json_path).unwrap(), report);

    let svg = fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_empty_samples_dir_gives_empty_report() {
    let dir = tempfile::tempdir().unwrap();

    let report = execute_analyze(args_for(dir.path())).unwrap();
    let states = report.state_report.unwrap();
    assert_eq!(states.total_records, 0);
    assert!(states.rows.is_empty());
    assert!(report.deadlock.is_none());
}

#[test]
fn test_format_file_overrides_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("threads-1.txt"),
        thread_block("main", "1", "BLOCKED", &["m.M.m(M.java:1)"]),
    )
    .unwrap();

    let format = SnapshotFormat {
        dump_file_prefix: "threads-".to_string(),
        ..SnapshotFormat::default()
    };
    let format_path = dir.path().join("format.toml");
    fs::write(&format_path, format_to_toml(&format).unwrap()).unwrap();

    let args = AnalyzeArgs {
        format_file: Some(format_path),
        ..args_for(dir.path())
    };
    let report = execute_analyze(args).unwrap();

    let states = report.state_report.unwrap();
    assert_eq!(states.total_records, 1);
    assert_eq!(states.rows[0].state, ThreadState::Blocked);
}
