// End-to-end: controller driving the HTTP backend against a mock server

use std::sync::Arc;

use dashrev_history::{
    DocumentRef, HistoryConfig, HistoryController, HistoryEvent, Mode, RecordingEventPublisher,
};
use dashrev_http::{HttpConfig, HttpRevisionBackend};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Controller = HistoryController<HttpRevisionBackend, RecordingEventPublisher>;

fn controller(server: &MockServer) -> (Controller, Arc<RecordingEventPublisher>) {
    let backend = HttpRevisionBackend::new(HttpConfig::fast().with_base_url(server.uri())).unwrap();
    let events = Arc::new(RecordingEventPublisher::new());
    let controller = HistoryController::new(
        Arc::new(backend),
        Arc::clone(&events),
        DocumentRef::new(1, 6),
        "Carlos",
        HistoryConfig::default(),
    );
    (controller, events)
}

async fn mount_versions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/dashboards/db/1/versions"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "dashboardId": 1, "parentVersion": 5, "version": 6,
              "created": "2017-02-22T17:43:01-08:00", "createdBy": "admin", "message": "" },
            { "id": 2, "dashboardId": 1, "parentVersion": 4, "version": 5,
              "created": "2017-02-22T17:43:01-08:00", "createdBy": "admin", "message": "" },
            { "id": 1, "dashboardId": 1, "parentVersion": 0, "version": 4,
              "created": "2017-02-23T17:43:01-08:00", "createdBy": "admin", "message": "" }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_compare_restore_over_http() {
    let server = MockServer::start().await;
    mount_versions(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/dashboards/db/1/compare/4...6/basic"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ul class=\"diff\"></ul>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db/1/restore"))
        .and(body_json(json!({ "version": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dashboard": {
                "dashboard": { "id": 1, "version": 7, "title": "Ops" },
                "meta": { "canSave": true }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, events) = controller(&server);
    controller.reset_from_source().await.unwrap();
    let messages: Vec<String> = controller.revisions().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["Saved", "Saved", "Overwritten"]);

    controller.toggle(6, true);
    controller.toggle(4, true);
    let diff = controller.get_diff("basic").await.unwrap();
    assert_eq!(diff.as_text(), Some("<ul class=\"diff\"></ul>"));
    // cached
    controller.get_diff("basic").await.unwrap();

    controller.execute_restore(4).await.unwrap();
    assert_eq!(controller.mode(), Mode::List);
    assert_eq!(controller.revisions()[0].version, 7);
    assert_eq!(controller.revisions()[0].id, 4);
    assert_eq!(controller.document().version, 7);
    assert_eq!(events.error_count(), 0);
}

#[tokio::test]
async fn test_server_error_surfaces_as_single_notification() {
    let server = MockServer::start().await;
    mount_versions(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/dashboards/db/1/compare/5...6/basic"))
        .respond_with(ResponseTemplate::new(500).set_body_string("DiffError"))
        .mount(&server)
        .await;

    let (controller, events) = controller(&server);
    controller.reset_from_source().await.unwrap();
    controller.toggle(5, true);
    controller.toggle(6, true);

    assert!(controller.get_diff("basic").await.is_err());
    assert_eq!(controller.mode(), Mode::List);

    let errors: Vec<HistoryEvent> = events.events().into_iter().filter(|e| e.is_error()).collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        HistoryEvent::Notification { title, message, .. }
            if title == "There was an error fetching the diff" && message.contains("DiffError")
    ));
}
