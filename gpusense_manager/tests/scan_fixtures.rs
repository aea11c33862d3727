use gpusense_core::{Analyzer, ExecutionMode, FailureKind};
use gpusense_manager::report::{render_json, BatchSummary};
use gpusense_manager::scanner::{scan_directory, ScanOptions};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../gpusense_core/tests/fixtures")
}

#[test]
fn test_scan_core_fixtures() {
    let results = scan_directory(&fixtures(), &Analyzer::default(), &ScanOptions::default());

    assert_eq!(results.len(), 12);
    assert_eq!(results["gpu/gpu.py"].execution_mode, ExecutionMode::Gpu);
    assert_eq!(results["gpu/big_pytorch.py"].execution_mode, ExecutionMode::GpuPreferred);
    assert_eq!(results["cpu/small_pytorch.py"].execution_mode, ExecutionMode::CpuPreferred);
    assert_eq!(results["cpu/cpu.py"].execution_mode, ExecutionMode::Cpu);
    assert_eq!(results["broken.py"].failure, Some(FailureKind::Syntax));
    assert_eq!(results["python2.py"].failure, Some(FailureKind::Syntax));

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.count(ExecutionMode::Gpu), 2);
    assert_eq!(summary.count(ExecutionMode::GpuPreferred), 2);
    assert_eq!(summary.count(ExecutionMode::CpuPreferred), 4);
    assert_eq!(summary.count(ExecutionMode::Cpu), 4);
}

#[test]
fn test_scan_output_is_stable() {
    let analyzer = Analyzer::default();
    let first = scan_directory(&fixtures(), &analyzer, &ScanOptions::default());
    let second = scan_directory(&fixtures(), &analyzer, &ScanOptions::default());
    assert_eq!(
        render_json(&first, false).unwrap(),
        render_json(&second, false).unwrap()
    );
}

#[test]
fn test_exclude_pattern() {
    let options = ScanOptions {
        exclude: vec!["/gpu/".to_string()],
        ..Default::default()
    };
    let results = scan_directory(&fixtures(), &Analyzer::default(), &options);
    assert!(results.keys().all(|path| !path.starts_with("gpu/")));
    assert_eq!(results.len(), 8);
}
