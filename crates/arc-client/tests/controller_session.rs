//! End-to-end tests of a client session against a mock controller.
//!
//! Each test starts a wiremock server that plays the controller's login and
//! resource endpoints and drives the public client API against it.

use arc_client::{RcClient, WorkflowReporter};
use arc_core::client::TOKEN_HEADER;
use arc_core::{MediaType, RcClientConfig, ResourceType, Scheme};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RcClient {
    let config = RcClientConfig::new(server.address().to_string())
        .unwrap()
        .with_scheme(Scheme::Http)
        .with_credentials("admin", "admin123");
    RcClient::from_config(config).unwrap()
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_json(json!({"name": "admin", "password": "admin123"})))
        .respond_with(ResponseTemplate::new(200).insert_header(TOKEN_HEADER, token))
        .expect(1)
        .mount(server)
        .await;
}

async fn login_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.method.as_str() == "POST" && request.url.path() == "/api/v1/login")
        .count()
}

#[tokio::test]
async fn list_pods_end_to_end() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;

    let pods = r#"[{"uuid":"p-1","name":"pod1","state":"ACTIVE"}]"#;
    Mock::given(method("GET"))
        .and(path("/api/v1/pod"))
        .and(header(TOKEN_HEADER, "abc"))
        .and(headers("Accept", vec!["application/json", "application/yaml"]))
        .respond_with(ResponseTemplate::new(200).set_body_string(pods))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let outcome = client.list_pods().await.unwrap();

    assert_eq!(outcome.body, pods);
    assert_eq!(client.last_status(), Some(StatusCode::OK));
    assert_eq!(client.last_reason(), Some("OK"));
}

#[tokio::test]
async fn prefer_yaml_changes_accept_of_next_call_only() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/region"))
        .and(headers("Accept", vec!["application/yaml", "application/json"]))
        .respond_with(ResponseTemplate::new(200).set_body_string("- name: east\n"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.prefer_yaml();
    assert!(server.received_requests().await.unwrap().is_empty());

    let outcome = client.list_regions().await.unwrap();
    assert_eq!(outcome.body, "- name: east\n");
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprint/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such blueprint"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let outcome = client.show_blueprint("missing").await.unwrap();

    assert_eq!(outcome.status, StatusCode::NOT_FOUND);
    assert_eq!(outcome.body, "No such blueprint");
    assert!(!outcome.is_success());
    assert_eq!(client.last_reason(), Some("Not Found"));
}

#[tokio::test]
async fn delete_paths_with_and_without_force() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;
    let pod = Uuid::new_v4().to_string();

    Mock::given(method("DELETE"))
        .and(path(format!("/api/v1/pod/{pod}")))
        .and(header("Content-type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v1/pod/{pod}/force")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client
        .delete(ResourceType::Pod, &pod, MediaType::Json, false)
        .await
        .unwrap();
    client
        .delete(ResourceType::Pod, &pod, MediaType::Json, true)
        .await
        .unwrap();

    assert_eq!(client.last_status(), Some(StatusCode::NO_CONTENT));
    assert_eq!(login_count(&server).await, 1);
}

#[tokio::test]
async fn logout_clears_token_and_next_call_logs_in_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200).insert_header(TOKEN_HEADER, "abc"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/login"))
        .and(header(TOKEN_HEADER, "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.list_users().await.unwrap();
    assert!(client.is_authenticated());

    let outcome = client.logout().await.unwrap().unwrap();
    assert_eq!(outcome.status, StatusCode::OK);
    assert!(!client.is_authenticated());

    client.list_users().await.unwrap();
    assert_eq!(login_count(&server).await, 2);
}

#[tokio::test]
async fn logout_clears_token_even_when_rejected() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login("admin", "admin123").await.unwrap();

    let outcome = client.logout().await.unwrap().unwrap();
    assert_eq!(outcome.status, StatusCode::FORBIDDEN);
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn invalidate_token_forces_new_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(200).insert_header(TOKEN_HEADER, "abc"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"version":"1.0.0"}"#))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.list_versions().await.unwrap();
    client.invalidate_token();
    client.list_versions().await.unwrap();
}

#[tokio::test]
async fn workflow_reporter_over_client() {
    let server = MockServer::start().await;
    mount_login(&server, "abc").await;
    let pod = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/api/v1/podevent"))
        .and(body_json(json!({
            "uuid": pod,
            "level": "INFO",
            "message": format!("Finishing create workflow for POD {pod}")
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/podevent"))
        .and(body_json(json!({
            "uuid": pod,
            "level": "STATUS",
            "message": "State changed to: ACTIVE"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut reporter = WorkflowReporter::new(client_for(&server), pod.clone(), "create");
    let outcome = reporter.postamble().await.unwrap();
    assert_eq!(outcome.status, StatusCode::CREATED);

    let client = reporter.into_inner();
    assert!(client.is_authenticated());
}
