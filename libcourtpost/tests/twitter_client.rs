//! HTTP contract tests for the Twitter client
//!
//! A local wiremock server stands in for the API so the request shape and
//! the response/error mapping can be checked without network access.

use std::time::Duration;

use libcourtpost::accounts::{resolve, Account};
use libcourtpost::client::{ClientFactory, StatusApi, TwitterClientFactory};
use libcourtpost::config::ApiConfig;
use libcourtpost::{CredentialBundle, FailureKind, PostResult, Publisher, SubmissionError};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bundle() -> CredentialBundle {
    CredentialBundle::from_pairs([
        ("COURTLAB_API_KEY", "courtlab-key"),
        ("COURTLAB_API_SECRET", "courtlab-secret"),
        ("COURTLAB_ACCESS_TOKEN", "courtlab-token"),
        ("COURTLAB_ACCESS_SECRET", "courtlab-token-secret"),
        ("ESTHER_API_KEY", "esther-key"),
        ("ESTHER_API_SECRET", "esther-secret"),
        ("ESTHER_ACCESS_TOKEN", "esther-token"),
        ("ESTHER_ACCESS_SECRET", "esther-token-secret"),
    ])
}

fn factory_for(server: &MockServer) -> TwitterClientFactory {
    TwitterClientFactory::new(&ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..ApiConfig::default()
    })
}

#[tokio::test]
async fn test_create_post_sends_signed_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header("content-type", "application/json"))
        .and(header_regex(
            "authorization",
            r#"^OAuth oauth_consumer_key="courtlab-key", oauth_nonce="[A-Za-z0-9]+", oauth_signature="[^"]+", oauth_signature_method="HMAC-SHA1", oauth_timestamp="\d+", oauth_token="courtlab-token", oauth_version="1.0"$"#,
        ))
        .and(body_json(json!({ "text": "hello" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({
                "data": { "id": "123", "text": "hello" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let creds = resolve(Account::Courtlab, &bundle()).unwrap();
    let client = factory_for(&server).build(creds).unwrap();
    assert_eq!(client.endpoint(), format!("{}/2/tweets", server.uri()));

    let created = client.create_post("hello").await.unwrap();
    assert_eq!(created.id, "123");
    assert_eq!(created.text.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_publisher_round_trip_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({
                "data": { "id": "1445880548472328192", "text": "hello" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let publisher = Publisher::new(bundle(), factory_for(&server));
    let result = publisher.publish("courtlab", "hello").await;

    assert_eq!(
        result,
        PostResult::Posted {
            id: "1445880548472328192".to_string(),
            url: "https://twitter.com/courtlab/status/1445880548472328192".to_string(),
        }
    );
}

#[tokio::test]
async fn test_duplicate_rejection_is_reported_verbatim_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You are not allowed to create a Tweet with duplicate content.",
            "type": "about:blank",
            "title": "Forbidden",
            "status": 403
        })))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = Publisher::new(bundle(), factory_for(&server));
    let result = publisher.publish("esther", "hi").await;

    assert_eq!(
        result,
        PostResult::Failed {
            kind: FailureKind::Rejected,
            reason: "You are not allowed to create a Tweet with duplicate content.".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "type": "about:blank",
            "status": 401,
            "detail": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creds = resolve(Account::Esther, &bundle()).unwrap();
    let client = factory_for(&server).build(creds).unwrap();

    let err = client.create_post("hi").await.unwrap_err();
    assert_eq!(err, SubmissionError::Authentication("Unauthorized".to_string()));
}

#[tokio::test]
async fn test_success_with_unparsable_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let creds = resolve(Account::Courtlab, &bundle()).unwrap();
    let client = factory_for(&server).build(creds).unwrap();

    let err = client.create_post("hi").await.unwrap_err();
    assert!(matches!(err, SubmissionError::Response(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": { "id": "1", "text": "hi" } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let factory = TwitterClientFactory::new(&ApiConfig {
        base_url: server.uri(),
        timeout_secs: 1,
        ..ApiConfig::default()
    });
    let publisher = Publisher::new(bundle(), factory);

    let result = publisher.publish("courtlab", "hi").await;
    assert!(matches!(
        result,
        PostResult::Failed {
            kind: FailureKind::Transport,
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let factory = TwitterClientFactory::new(&ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 5,
        ..ApiConfig::default()
    });
    let creds = resolve(Account::Courtlab, &bundle()).unwrap();
    let client = factory.build(creds).unwrap();

    let err = client.create_post("hi").await.unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));
}

#[tokio::test]
async fn test_missing_credentials_make_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let partial = CredentialBundle::from_pairs([
        ("ESTHER_API_KEY", "k"),
        ("ESTHER_API_SECRET", "s"),
        ("ESTHER_ACCESS_TOKEN", "t"),
    ]);
    let publisher = Publisher::new(partial, factory_for(&server));

    let result = publisher.publish("esther", "hi").await;
    assert_eq!(
        result,
        PostResult::Failed {
            kind: FailureKind::MissingCredential,
            reason: "Missing credential: ESTHER_ACCESS_SECRET".to_string(),
        }
    );
}
