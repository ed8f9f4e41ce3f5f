use otf_client::config::Config;
use otf_client::http_client::ReqwestOtfClient;
use otf_client::{OtfApi, OtfError};
use secrecy::{ExposeSecret, SecretString};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(auth_url: &str, api_base_url: &str) -> Config {
    Config::from_env_with(|k| match k {
        "OTF_EMAIL" => Some("member@example.com".into()),
        "OTF_PASSWORD" => Some("hunter2".into()),
        "OTF_AUTH_URL" => Some(auth_url.into()),
        "OTF_API_BASE_URL" => Some(api_base_url.into()),
        _ => None,
    })
    .expect("config")
}

#[tokio::test]
async fn authenticate_posts_user_password_flow_and_parses_id_token() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "AuthenticationResult": {"IdToken": "tok-123", "TokenType": "Bearer"}
    });
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(
            "X-Amz-Target",
            "AWSCognitoIdentityProviderService.InitiateAuth",
        ))
        .and(body_string_contains("USER_PASSWORD_AUTH"))
        .and(body_string_contains("member@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let token = client.authenticate().await.expect("token");
    assert_eq!(token.expose_secret(), "tok-123");
}

#[tokio::test]
async fn authenticate_maps_rejection_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"__type": "NotAuthorizedException"})),
        )
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let err = client.authenticate().await.expect_err("should fail");
    assert!(matches!(err, OtfError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn authenticate_without_id_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let err = client.authenticate().await.expect_err("should fail");
    assert!(matches!(err, OtfError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn workouts_fetch_sends_token_and_parses_entries() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": [
            {
                "memberUuId": "uuid-1",
                "minuteByMinuteHr": "[100, 110, 120]",
                "classType": "Orange 60 Min 2G"
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/virtual-class/in-studio-workouts"))
        .and(header("Authorization", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let payload = client
        .get_in_studio_workouts(&SecretString::new("tok-123".into()))
        .await
        .expect("payload");
    assert_eq!(payload.data.len(), 1);
    assert_eq!(payload.member_uuid(), Some("uuid-1"));
    assert_eq!(
        payload.data[0].minute_by_minute_hr.as_deref(),
        Some("[100, 110, 120]")
    );
}

#[tokio::test]
async fn member_summary_requests_class_summary_include() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "data": {
            "homeStudio": {"studioName": "Downtown"},
            "memberClassSummary": {"totalClassesAttended": 42},
            "maxHr": 190
        }
    });
    Mock::given(method("GET"))
        .and(path("/member/members/uuid-1"))
        .and(query_param("include", "memberClassSummary"))
        .and(header("Authorization", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let member = client
        .get_member_summary(&SecretString::new("tok-123".into()), "uuid-1")
        .await
        .expect("member");
    assert_eq!(
        member.home_studio.and_then(|s| s.studio_name).as_deref(),
        Some("Downtown")
    );
    assert_eq!(
        member
            .member_class_summary
            .and_then(|s| s.total_classes_attended),
        Some(42)
    );
}

#[tokio::test]
async fn upstream_failure_propagates_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/virtual-class/in-studio-workouts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = ReqwestOtfClient::new(&test_config(&format!("{}/", server.uri()), &server.uri()));
    let err = client
        .get_in_studio_workouts(&SecretString::new("tok".into()))
        .await
        .expect_err("should fail");
    match err {
        OtfError::Api { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("bad gateway"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
