mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{file_names, out_path, read, record_indices, test_config, FakeRenderer};
use page_harvest::models::loaders::load_schema;
use page_harvest::services::FailureStore;
use page_harvest::{App, ExtractionResult, RecordExtractor, Task, TaskFlow, WorkerPool};

fn flow(renderer: FakeRenderer) -> Arc<TaskFlow<FakeRenderer>> {
    let extractor = RecordExtractor::compile(&load_schema("shabda").unwrap()).unwrap();
    Arc::new(TaskFlow::new(renderer, Arc::new(extractor), Duration::ZERO))
}

fn tasks(n: usize) -> Vec<Task> {
    common::locators(n)
        .into_iter()
        .enumerate()
        .map(|(i, l)| Task::new(i, l))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_twelve_items_three_batches_and_selective_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 12);
    let renderer = FakeRenderer::new();
    let app = App::with_renderer(config.clone(), renderer.clone()).unwrap();

    let summary = app.run().await.unwrap();
    assert_eq!(summary.batches_written, 3);
    assert_eq!(summary.records, 12);
    assert_eq!(renderer.calls(), 12);
    assert_eq!(
        file_names(&config.output_dir),
        vec!["shabda_0_5.txt", "shabda_10_12.txt", "shabda_5_10.txt"]
    );
    assert_eq!(
        record_indices(&read(&out_path(&config, "shabda_10_12.txt"))),
        vec![10, 11]
    );

    let first = read(&out_path(&config, "shabda_0_5.txt"));
    let second = read(&out_path(&config, "shabda_5_10.txt"));
    let third = read(&out_path(&config, "shabda_10_12.txt"));

    std::fs::remove_file(out_path(&config, "shabda_0_5.txt")).unwrap();
    let summary = app.run().await.unwrap();

    assert_eq!(summary.batches_written, 1);
    assert_eq!(summary.batches_skipped, 2);
    assert_eq!(renderer.calls(), 17);
    assert_eq!(read(&out_path(&config, "shabda_0_5.txt")), first);
    assert_eq!(read(&out_path(&config, "shabda_5_10.txt")), second);
    assert_eq!(read(&out_path(&config, "shabda_10_12.txt")), third);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interrupted_run_resumes_to_identical_output() {
    let uninterrupted = tempfile::tempdir().unwrap();
    let config_a = test_config(uninterrupted.path(), 12);
    App::with_renderer(config_a.clone(), FakeRenderer::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    let resumed = tempfile::tempdir().unwrap();
    let config_b = test_config(resumed.path(), 12);
    // 第一次只跑到第二批结束，模拟中断
    let partial = page_harvest::Config {
        end_index: Some(10),
        ..config_b.clone()
    };
    App::with_renderer(partial, FakeRenderer::new())
        .unwrap()
        .run()
        .await
        .unwrap();
    let before = read(&out_path(&config_b, "shabda_5_10.txt"));

    let renderer = FakeRenderer::new();
    let summary = App::with_renderer(config_b.clone(), renderer.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.batches_skipped, 2);
    assert_eq!(renderer.rendered().len(), 2);
    assert_eq!(read(&out_path(&config_b, "shabda_5_10.txt")), before);

    for name in ["shabda_0_5.txt", "shabda_5_10.txt", "shabda_10_12.txt"] {
        assert_eq!(
            read(&out_path(&config_a, name)),
            read(&out_path(&config_b, name)),
            "{name} differs"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_index_preservation_and_concurrency_bound() {
    for workers in [1, 5, 10] {
        let renderer = FakeRenderer::new();
        let results = WorkerPool::new(workers)
            .run(&flow(renderer.clone()), tasks(23))
            .await
            .unwrap();

        let mut indices: Vec<usize> = results.iter().map(ExtractionResult::index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..23).collect::<Vec<_>>(), "workers = {workers}");
        assert!(renderer.max_live() <= workers, "workers = {workers}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_failure_does_not_touch_siblings() {
    let clean = WorkerPool::new(3)
        .run(&flow(FakeRenderer::new()), tasks(8))
        .await
        .unwrap();

    let renderer = FakeRenderer::new();
    renderer.set_failing(&[5]);
    let with_failure = WorkerPool::new(3)
        .run(&flow(renderer), tasks(8))
        .await
        .unwrap();

    assert_eq!(with_failure.len(), 8);
    for result in &with_failure {
        if result.index() == 5 {
            assert!(matches!(
                result,
                ExtractionResult::Failure { locator, .. } if locator.ends_with("/5")
            ));
        } else {
            let twin = clean.iter().find(|r| r.index() == result.index()).unwrap();
            assert_eq!(result, twin);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fatal_session_error_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 12);
    let renderer = FakeRenderer::new();
    renderer.set_fatal(&[6]);

    let result = App::with_renderer(config.clone(), renderer).unwrap().run().await;

    assert!(result.is_err());
    assert!(out_path(&config, "shabda_0_5.txt").exists());
    assert!(!out_path(&config, "shabda_5_10.txt").exists());
    assert!(!out_path(&config, "shabda_10_12.txt").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fatal_error_stops_further_dispatch() {
    let renderer = FakeRenderer::new();
    renderer.set_fatal(&[0]);

    let result = WorkerPool::new(1).run(&flow(renderer.clone()), tasks(10)).await;

    assert!(result.is_err());
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_task_becomes_failure() {
    let renderer = FakeRenderer::new();
    renderer.set_panicking(&[3]);

    let results = WorkerPool::new(2)
        .run(&flow(renderer), tasks(6))
        .await
        .unwrap();

    assert_eq!(results.len(), 6);
    for result in &results {
        if result.index() == 3 {
            assert!(matches!(
                result,
                ExtractionResult::Failure { locator, cause, .. }
                    if locator.ends_with("/3") && cause.contains("panic")
            ));
        } else {
            assert!(result.is_success(), "index {}", result.index());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_retry_shrinks_failure_sets() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 12);
    let renderer = FakeRenderer::new();
    renderer.set_failing(&[2, 8]);
    let app = App::with_renderer(config.clone(), renderer.clone()).unwrap();

    let summary = app.run().await.unwrap();
    assert_eq!(summary.records, 10);
    assert_eq!(summary.failures, 2);
    assert_eq!(
        record_indices(&read(&out_path(&config, "shabda_0_5.txt"))),
        vec![0, 1, 3, 4]
    );

    let first_failures = out_path(&config, "shabda_failed_0_5.json");
    let second_failures = out_path(&config, "shabda_failed_5_10.json");
    assert!(first_failures.exists());
    assert!(second_failures.exists());
    assert!(!out_path(&config, "shabda_failed_10_12.json").exists());

    // 第一轮：2 恢复，8 仍失败
    renderer.set_failing(&[8]);
    let outcomes = app.retry_all().await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes.iter().map(|o| o.recovered).sum::<usize>(), 1);

    assert!(FailureStore::load(&first_failures).unwrap().is_empty());
    let remaining = FailureStore::load(&second_failures).unwrap();
    assert_eq!(remaining.entries()[0].index, 8);

    let retry_output = out_path(&config, "shabda_failed_0_5_retry1.txt");
    assert_eq!(record_indices(&read(&retry_output)), vec![2]);
    assert!(!out_path(&config, "shabda_failed_5_10_retry1.txt").exists());

    // 第二轮：只剩一个失败文件需要处理
    renderer.set_failing(&[]);
    let outcome = app.retry(&second_failures).await.unwrap();
    assert_eq!(outcome.recovered, 1);
    assert_eq!(outcome.still_failed, 0);
    assert!(FailureStore::load(&second_failures).unwrap().is_empty());
    assert_eq!(
        FailureStore::outstanding(&config.output_dir, "shabda").unwrap(),
        Vec::<std::path::PathBuf>::new()
    );

    // 批次文件从未被改动
    assert_eq!(
        record_indices(&read(&out_path(&config, "shabda_5_10.txt"))),
        vec![5, 6, 7, 9]
    );
}

#[tokio::test]
async fn test_range_offsets_name_batches_by_absolute_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = page_harvest::Config {
        start_index: 3,
        end_index: Some(9),
        batch_width: 4,
        ..test_config(dir.path(), 12)
    };

    App::with_renderer(config.clone(), FakeRenderer::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        file_names(&config.output_dir),
        vec!["shabda_3_7.txt", "shabda_7_9.txt"]
    );
    assert_eq!(
        record_indices(&read(&out_path(&config, "shabda_3_7.txt"))),
        vec![3, 4, 5, 6]
    );
}
