//! Isolation across concurrently executing logical units of work

use std::sync::{Arc, Barrier};

use sluice::dispatch::RecordingDispatcher;
use sluice::{request, Boundary, EffectArgs, FnEffect, ScopedFutureExt, SluiceResult};
use sluice_gates::AllowAll;

fn noop(name: &str) -> Arc<dyn sluice::Effect> {
    FnEffect::shared(name, |_| Ok(()))
}

fn boundary_with(recorder: &RecordingDispatcher) -> Boundary {
    Boundary::builder()
        .gate(Arc::new(AllowAll))
        .dispatcher(Arc::new(recorder.clone()))
        .build()
}

#[test]
fn os_threads_never_observe_each_others_boundary() {
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|unit| {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let recorder = RecordingDispatcher::new();
                let boundary = boundary_with(&recorder);

                boundary
                    .run(|| {
                        request(noop(&format!("unit{unit}_first")), EffectArgs::new())?;
                        // Suspend with the boundary mid-flight while the
                        // other unit mutates its own slot.
                        barrier.wait();
                        request(noop(&format!("unit{unit}_second")), EffectArgs::new())
                    })
                    .unwrap();

                recorder.recorded_names()
            })
        })
        .collect();

    let mut results: Vec<Vec<String>> = handles
        .into_iter()
        .map(|h| h.join().expect("worker thread panicked"))
        .collect();
    results.sort();

    assert_eq!(
        results,
        vec![
            vec!["unit0_first".to_string(), "unit0_second".to_string()],
            vec!["unit1_first".to_string(), "unit1_second".to_string()],
        ]
    );
}

#[tokio::test]
async fn interleaved_tasks_on_one_executor_thread_stay_isolated() {
    // current_thread runtime: both tasks share one OS thread, so isolation
    // can only come from the per-poll enter/exit discipline.
    let mut joins = Vec::new();
    for unit in 0..2 {
        let recorder = RecordingDispatcher::new();
        let boundary = boundary_with(&recorder);

        let fut = async move {
            request(noop(&format!("task{unit}_first")), EffectArgs::new())?;
            tokio::task::yield_now().await;
            request(noop(&format!("task{unit}_second")), EffectArgs::new())?;
            tokio::task::yield_now().await;
            request(noop(&format!("task{unit}_third")), EffectArgs::new())
        }
        .in_boundary(boundary);

        joins.push(tokio::spawn(async move {
            fut.await?;
            Ok::<_, sluice::SluiceError>(recorder.recorded_names())
        }));
    }

    for (unit, join) in joins.into_iter().enumerate() {
        let names = join.await.expect("task panicked").unwrap();
        assert_eq!(
            names,
            vec![
                format!("task{unit}_first"),
                format!("task{unit}_second"),
                format!("task{unit}_third"),
            ]
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tasks_on_a_multi_thread_runtime_stay_isolated() {
    let mut joins = Vec::new();
    for unit in 0..8 {
        let recorder = RecordingDispatcher::new();
        let boundary = boundary_with(&recorder);

        let fut = async move {
            for step in 0..4 {
                request(noop(&format!("task{unit}_step{step}")), EffectArgs::new())?;
                tokio::task::yield_now().await;
            }
            Ok(())
        }
        .in_boundary(boundary);

        joins.push(tokio::spawn(async move {
            fut.await?;
            Ok::<_, sluice::SluiceError>(recorder.recorded_names())
        }));
    }

    for (unit, join) in joins.into_iter().enumerate() {
        let names = join.await.expect("task panicked").unwrap();
        let expected: Vec<String> = (0..4).map(|step| format!("task{unit}_step{step}")).collect();
        assert_eq!(names, expected);
    }
}

#[tokio::test]
async fn nested_scoped_futures_negotiate_like_nested_scopes() {
    let outer_recorder = RecordingDispatcher::new();
    let inner_recorder = RecordingDispatcher::new();
    let outer = boundary_with(&outer_recorder);
    let inner = boundary_with(&inner_recorder);

    let inner_recorder_probe = inner_recorder.clone();
    async move {
        request(noop("a"), EffectArgs::new())?;

        async move {
            request(noop("b"), EffectArgs::new())?;
            tokio::task::yield_now().await;
            Ok(())
        }
        .in_boundary(inner)
        .await?;

        assert!(inner_recorder_probe.is_empty());
        request(noop("c"), EffectArgs::new())
    }
    .in_boundary(outer)
    .await
    .unwrap();

    assert_eq!(outer_recorder.recorded_names(), vec!["a", "b", "c"]);
    assert!(inner_recorder.is_empty());
}

#[test]
fn cancelled_scoped_future_abandons_its_boundary_cleanly() {
    let recorder = RecordingDispatcher::new();
    let boundary = boundary_with(&recorder);
    let probe = boundary.clone();

    let fut = async {
        request(noop("never_escapes"), EffectArgs::new())?;
        std::future::pending::<SluiceResult<()>>().await
    }
    .in_boundary(boundary);

    let mut task = tokio_test::task::spawn(fut);
    assert!(task.poll().is_pending());
    assert_eq!(probe.intents().len(), 1);

    drop(task);

    // Ambient state is clean, nothing dispatched, the boundary was
    // simply never released.
    assert!(sluice::current_boundary().is_none());
    assert!(recorder.is_empty());
    assert!(!probe.is_active());
    assert!(!probe.is_released());
    assert!(!probe.is_aborted());
}

#[tokio::test]
async fn scoped_future_aborts_on_error() {
    let recorder = RecordingDispatcher::new();
    let boundary = boundary_with(&recorder);
    let probe = boundary.clone();

    let result: SluiceResult<()> = async {
        request(noop("doomed"), EffectArgs::new())?;
        Err(sluice::SluiceError::dispatch("handler failed"))
    }
    .in_boundary(boundary)
    .await;

    assert!(result.is_err());
    assert!(probe.is_aborted());
    assert!(recorder.is_empty());
}
