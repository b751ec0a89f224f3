//! End-to-end pipeline behavior against the fake engine.

mod support;

use std::path::PathBuf;

use reelforge_common::ReelforgeError;
use reelforge_compose::{
    concat_compatible, run_pipeline, CancelHandle, PipelineRequest, STAGE_OVERLAY,
};
use reelforge_media_model::{OperationKind, Resolution, TimeWindow};

use support::{meta, FakeEngine};

struct Fixture {
    _dir: tempfile::TempDir,
    request: PipelineRequest,
    work_base: PathBuf,
}

fn fixture(include_lead_in: bool) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let touch = |name: &str| {
        let path = dir.path().join(name);
        std::fs::write(&path, b"source").unwrap();
        path
    };

    let request = PipelineRequest {
        background: touch("background.mp4"),
        overlay: touch("overlay.mp4"),
        audio: touch("audio.mp3"),
        target: Resolution::new(1080, 1920).unwrap(),
        window: TimeWindow::new(10.0, 20.0),
        include_lead_in,
        lead_in_secs: 10.0,
        output: dir.path().join("exports").join("final.mp4"),
    };
    let work_base = dir.path().join("work");

    Fixture {
        _dir: dir,
        request,
        work_base,
    }
}

fn remaining_entries(base: &std::path::Path) -> usize {
    match std::fs::read_dir(base) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[tokio::test]
async fn full_pipeline_executes_the_fixed_stage_order() {
    let engine = FakeEngine::new();
    let fx = fixture(true);

    let output = run_pipeline(
        engine.clone(),
        fx.request.clone(),
        &fx.work_base,
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(output, fx.request.output);
    assert!(output.exists());
    assert_eq!(
        engine.job_kinds(),
        vec![
            OperationKind::Trim,
            OperationKind::Scale,
            OperationKind::Concat,
            OperationKind::Overlay,
            OperationKind::StripAudio,
            OperationKind::MuxAudio,
        ]
    );

    let jobs = engine.jobs();
    let overlay = &jobs[3];
    let filter = overlay.filter.as_deref().unwrap();
    assert!(filter.contains("overlay=enable='between(t,10,30)'"));
    // With a lead-in, the overlay consumes the spliced track, not the
    // raw overlay clip.
    assert!(overlay.inputs[1].path.ends_with("overlay-track.mp4"));

    let mux = &jobs[5];
    assert_eq!(mux.output, fx.request.output);
    assert!(mux.output_args.contains(&"-shortest".to_string()));

    // All per-run directories are torn down; only the final output survives.
    assert_eq!(remaining_entries(&fx.work_base), 0);
}

#[tokio::test]
async fn straight_merge_skips_the_lead_in_stage() {
    let engine = FakeEngine::new();
    let fx = fixture(false);

    run_pipeline(
        engine.clone(),
        fx.request.clone(),
        &fx.work_base,
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        engine.job_kinds(),
        vec![
            OperationKind::Overlay,
            OperationKind::StripAudio,
            OperationKind::MuxAudio,
        ]
    );

    let overlay = &engine.jobs()[0];
    assert_eq!(overlay.inputs[1].path, fx.request.overlay);
}

#[tokio::test]
async fn failure_mid_pipeline_reports_the_stage_and_aborts_the_rest() {
    let engine = FakeEngine::failing_on(OperationKind::Overlay);
    let fx = fixture(true);

    let err = run_pipeline(
        engine.clone(),
        fx.request.clone(),
        &fx.work_base,
        None,
        None,
    )
    .await
    .unwrap_err();

    match err {
        ReelforgeError::Pipeline { stage, ref source, .. } => {
            assert_eq!(stage, STAGE_OVERLAY);
            assert!(matches!(**source, ReelforgeError::Engine { .. }));
        }
        other => panic!("expected Pipeline error, got {other}"),
    }

    // Lead-in ran, nothing after the failed overlay did.
    assert_eq!(
        engine.job_kinds(),
        vec![
            OperationKind::Trim,
            OperationKind::Scale,
            OperationKind::Concat,
        ]
    );
    assert!(!fx.request.output.exists());
    assert_eq!(remaining_entries(&fx.work_base), 0);
}

#[tokio::test]
async fn cancelled_runs_never_start_a_stage() {
    let engine = FakeEngine::new();
    let fx = fixture(true);

    let cancel = CancelHandle::new();
    cancel.cancel();

    let err = run_pipeline(
        engine.clone(),
        fx.request.clone(),
        &fx.work_base,
        None,
        Some(cancel),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReelforgeError::Cancelled { .. }));
    assert!(engine.jobs().is_empty());
}

#[tokio::test]
async fn identical_requests_yield_identical_job_sequences_in_distinct_workdirs() {
    let engine = FakeEngine::new();
    let fx = fixture(true);

    run_pipeline(
        engine.clone(),
        fx.request.clone(),
        &fx.work_base,
        None,
        None,
    )
    .await
    .unwrap();

    let mut second = fx.request.clone();
    second.output = fx.request.output.with_file_name("final-2.mp4");
    run_pipeline(engine.clone(), second, &fx.work_base, None, None)
        .await
        .unwrap();

    let jobs = engine.jobs();
    assert_eq!(jobs.len(), 12);
    let (first_run, second_run) = jobs.split_at(6);

    for (a, b) in first_run.iter().zip(second_run.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.filter, b.filter);
        assert_eq!(a.output_args, b.output_args);
        // Same stage artifact names, different per-run directories.
        if a.kind != OperationKind::MuxAudio {
            assert_eq!(a.output.file_name(), b.output.file_name());
            assert_ne!(a.output.parent(), b.output.parent());
        }
    }
}

#[tokio::test]
async fn doomed_stream_copy_concat_never_reaches_the_engine() {
    let a = PathBuf::from("/m/a.mp4");
    let b = PathBuf::from("/m/b.mp4");
    let engine = FakeEngine::with_metas(vec![
        (a.clone(), meta(1080, 1920, "h264", "30/1", 8.0)),
        (b.clone(), meta(1080, 1920, "h264", "60/1", 8.0)),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let err = concat_compatible(
        engine.clone(),
        vec![a, b],
        dir.path().join("joined.mp4"),
        &dir.path().join("work"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReelforgeError::Incompatible { .. }));
    assert!(engine.jobs().is_empty());
}

#[tokio::test]
async fn approved_stream_copy_concat_dispatches_exactly_once() {
    let a = PathBuf::from("/m/a.mp4");
    let b = PathBuf::from("/m/b.mp4");
    let shared = meta(1080, 1920, "h264", "30/1", 8.0);
    let engine = FakeEngine::with_metas(vec![(a.clone(), shared.clone()), (b.clone(), shared)]);

    let dir = tempfile::tempdir().unwrap();
    let output = concat_compatible(
        engine.clone(),
        vec![a.clone(), b.clone()],
        dir.path().join("joined.mp4"),
        &dir.path().join("work"),
    )
    .await
    .unwrap();

    assert!(output.exists());
    let jobs = engine.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].output_args, vec!["-c".to_string(), "copy".to_string()]);
    assert_eq!(jobs[0].expected_duration_secs, Some(16.0));
    assert!(jobs[0].filter.is_none());
}
