// Restore workflow tests: confirmation, optimistic and refetch strategies,
// failures and the single in-flight restore

use dashrev_history::{
    ConfirmAction, HistoryConfig, HistoryError, HistoryEvent, Mode, Operation, RestoreState,
    RestoreStrategy,
};
use dashrev_integration_tests::{controller_with, fixture, Call, MockBackend};
use std::sync::Arc;

#[tokio::test]
async fn test_request_restore_only_prompts() {
    let (controller, backend, events) = fixture();
    controller.reset_from_source().await.unwrap();

    controller.request_restore(4).await.unwrap();

    assert_eq!(controller.restore_state(), RestoreState::Confirming { version: 4 });
    assert_eq!(backend.call_count(Operation::Restore), 0);
    let prompt = events
        .events()
        .into_iter()
        .find_map(|e| match e {
            HistoryEvent::ConfirmRequested(prompt) => Some(prompt),
            _ => None,
        })
        .unwrap();
    assert_eq!(prompt.title, "Restore version");
    assert_eq!(
        prompt.text2,
        "Are you sure you want to restore the dashboard to version 4? All unsaved changes will be lost."
    );
    assert_eq!(prompt.icon, "fa-rotate-right");
    assert_eq!(prompt.yes_text, "Yes, restore to version 4");
    assert_eq!(prompt.on_confirm, ConfirmAction::Restore { version: 4 });
}

#[tokio::test]
async fn test_cancelled_restore_does_nothing() {
    let (controller, backend, _) = fixture();
    controller.reset_from_source().await.unwrap();

    controller.request_restore(4).await.unwrap();
    assert!(controller.cancel_restore());

    assert_eq!(controller.restore_state(), RestoreState::Idle);
    assert_eq!(backend.call_count(Operation::Restore), 0);
    assert_eq!(controller.revisions().len(), 3);
}

#[tokio::test]
async fn test_optimistic_restore_synthesizes_head() {
    let (controller, backend, events) = fixture();
    controller.reset_from_source().await.unwrap();
    controller.toggle(4, true);
    controller.toggle(6, true);
    controller.get_diff("basic").await.unwrap();

    controller.request_restore(4).await.unwrap();
    controller
        .confirm(ConfirmAction::Restore { version: 4 })
        .await
        .unwrap();

    let revisions = controller.revisions();
    assert_eq!(revisions.len(), 4);
    let head = &revisions[0];
    assert_eq!(head.id, 4);
    assert_eq!(head.version, 7);
    assert_eq!(head.parent_version, 4);
    assert_eq!(head.document_id, 1);
    assert_eq!(head.created_by, "Carlos");
    assert_eq!(head.message, "Restored from version 4");
    assert!(!head.checked);

    assert_eq!(controller.mode(), Mode::List);
    assert!(controller.selected().is_empty());
    assert_eq!(controller.cached_diff_count(), 0);
    assert_eq!(controller.document().version, 7);
    assert_eq!(controller.restore_state(), RestoreState::Idle);
    assert!(!controller.is_loading());
    // no refetch in optimistic mode
    assert_eq!(backend.call_count(Operation::FetchRevisions), 1);
    assert_eq!(
        backend.calls().last(),
        Some(&Call::Restore {
            document_id: Some(1),
            version: 4
        })
    );

    let restored = events
        .events()
        .into_iter()
        .find_map(|e| match e {
            HistoryEvent::DocumentRestored {
                document,
                restored_from,
            } => Some((document, restored_from)),
            _ => None,
        })
        .unwrap();
    assert_eq!(restored.1, 4);
    assert_eq!(restored.0.version, 7);
    assert_eq!(restored.0.dashboard["title"], "Ops");
}

#[tokio::test]
async fn test_refetch_strategy_reloads_log() {
    let (controller, backend, _) = controller_with(
        MockBackend::three_versions(),
        6,
        HistoryConfig::default().with_restore_strategy(RestoreStrategy::Refetch),
    );
    controller.reset_from_source().await.unwrap();

    controller.execute_restore(4).await.unwrap();

    assert_eq!(backend.call_count(Operation::FetchRevisions), 2);
    let head = &controller.revisions()[0];
    assert_eq!(head.version, 7);
    assert_eq!(head.restored_from, Some(4));
    assert_eq!(head.message, "Restored from version 4");
    assert_eq!(controller.mode(), Mode::List);
}

#[tokio::test]
async fn test_optimistic_restore_without_log_falls_back_to_refetch() {
    let (controller, backend, _) = fixture();

    controller.execute_restore(5).await.unwrap();

    assert_eq!(backend.call_count(Operation::FetchRevisions), 1);
    assert_eq!(controller.revisions().len(), 4);
    assert_eq!(controller.revisions()[0].version, 7);
}

#[tokio::test]
async fn test_failed_restore_leaves_state_untouched() {
    let (controller, backend, events) = fixture();
    controller.reset_from_source().await.unwrap();
    controller.toggle(4, true);
    controller.toggle(6, true);
    controller.get_diff("basic").await.unwrap();
    backend.fail(Operation::Restore);

    let err = controller.execute_restore(4).await.unwrap_err();

    assert!(err.is_network_failure());
    assert_eq!(controller.revisions().len(), 3);
    assert_eq!(controller.mode(), Mode::Compare);
    assert_eq!(controller.selected(), vec![4, 6]);
    assert_eq!(controller.cached_diff_count(), 1);
    assert_eq!(controller.document().version, 6);
    assert_eq!(controller.restore_state(), RestoreState::Idle);
    assert!(!controller.is_loading());
    assert_eq!(events.error_count(), 1);
    assert!(events.events().iter().any(|e| matches!(
        e,
        HistoryEvent::Notification { title, .. }
            if title == "There was an error restoring the dashboard"
    )));
}

#[tokio::test]
async fn test_empty_restore_result_is_an_error() {
    let (controller, backend, events) = fixture();
    controller.reset_from_source().await.unwrap();
    backend.empty_restores();

    let err = controller.execute_restore(4).await.unwrap_err();

    assert!(matches!(err, HistoryError::EmptyResponse(Operation::Restore)));
    assert_eq!(controller.revisions().len(), 3);
    assert_eq!(controller.document().version, 6);
    assert_eq!(events.error_count(), 1);
    assert!(!events
        .events()
        .iter()
        .any(|e| matches!(e, HistoryEvent::DocumentRestored { .. })));
}

#[tokio::test]
async fn test_second_restore_is_rejected_while_executing() {
    let (controller, backend, _) = fixture();
    controller.reset_from_source().await.unwrap();
    let gate = backend.hold(Operation::Restore);

    let running = Arc::clone(&controller);
    let first = tokio::spawn(async move { running.execute_restore(4).await });
    backend.wait_for_calls(Operation::Restore, 1).await;

    assert!(controller.is_loading());
    assert_eq!(controller.restore_state(), RestoreState::Executing { version: 4 });
    assert!(matches!(
        controller.execute_restore(5).await,
        Err(HistoryError::RestoreInProgress(4))
    ));
    assert!(matches!(
        controller.request_restore(5).await,
        Err(HistoryError::RestoreInProgress(4))
    ));

    gate.add_permits(1);
    first.await.unwrap().unwrap();

    assert_eq!(backend.call_count(Operation::Restore), 1);
    assert_eq!(controller.revisions()[0].version, 7);
    assert_eq!(controller.restore_state(), RestoreState::Idle);
}

#[tokio::test]
async fn test_restore_completing_after_detach_is_ignored() {
    let (controller, backend, events) = fixture();
    controller.reset_from_source().await.unwrap();
    let gate = backend.hold(Operation::Restore);

    let running = Arc::clone(&controller);
    let pending = tokio::spawn(async move { running.execute_restore(4).await });
    backend.wait_for_calls(Operation::Restore, 1).await;

    controller.detach();
    gate.add_permits(1);

    assert!(matches!(
        pending.await.unwrap(),
        Err(HistoryError::Superseded(Operation::Restore))
    ));
    assert!(controller.revisions().is_empty());
    assert_eq!(controller.document().version, 6);
    assert!(!events
        .events()
        .iter()
        .any(|e| matches!(e, HistoryEvent::DocumentRestored { .. })));
    assert_eq!(events.error_count(), 0);
}
