//! Integration tests for `HttpNoticeSource` against a mock search API.

use std::time::Duration;

use notice_harvester::{
    AgeRange, DetailRef, FilterSpec, HarvestConfig, HttpNoticeSource, NoticeSource, Sex,
    SourceError,
};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::mock_api::start_mock_api;

fn source_for(server: &MockServer, configure: impl FnOnce(&mut HarvestConfig)) -> HttpNoticeSource {
    let mut config = HarvestConfig {
        base_url: format!("{}/notices/v1/red", server.uri()),
        ..HarvestConfig::default()
    };
    configure(&mut config);
    HttpNoticeSource::new(&config).unwrap()
}

#[tokio::test]
async fn test_probe_total_sends_filter_as_query_parameters() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/notices/v1/red"))
        .and(query_param("page", "1"))
        .and(query_param("resultPerPage", "160"))
        .and(query_param("nationality", "RU"))
        .and(query_param("sexId", "F"))
        .and(query_param("ageMin", "18"))
        .and(query_param("ageMax", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 412,
            "_embedded": {"notices": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let filter = FilterSpec::for_facet("RU")
        .with_sex(Sex::Female)
        .with_ages(AgeRange::new(18, 30).unwrap());
    assert_eq!(source.probe_total(&filter).await.unwrap(), 412);
}

#[tokio::test]
async fn test_probe_total_falls_back_to_observed_results() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0,
            "_embedded": {"notices": [{"entity_id": "1"}, {"entity_id": "2"}, {"entity_id": "3"}]}
        })))
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    assert_eq!(source.probe_total(&FilterSpec::unfiltered()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_fetch_page_returns_embedded_notices() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .and(query_param("resultPerPage", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 25,
            "_embedded": {"notices": [
                {"entity_id": "2020/21", "_links": {"self": {"href": "https://x/2020-21"}}},
                {"entity_id": "2020/22"}
            ]}
        })))
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let notices = source
        .fetch_page(&FilterSpec::for_facet("FR"), 2, 20)
        .await
        .unwrap();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].entity_id(), "2020/21");
    assert_eq!(notices[0].self_link(), "https://x/2020-21");
}

#[tokio::test]
async fn test_non_success_status_maps_to_http_status_error() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let err = source.probe_total(&FilterSpec::unfiltered()).await.unwrap_err();
    assert!(matches!(err, SourceError::HttpStatus { status: 503, .. }), "{err:?}");
    assert_eq!(err.kind(), "http_status");
}

#[tokio::test]
async fn test_unparsable_body_maps_to_malformed_error() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let err = source
        .fetch_page(&FilterSpec::unfiltered(), 1, 160)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Malformed { .. }), "{err:?}");
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout_error() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total": 1}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let source = source_for(&server, |config| config.timeout = Duration::from_millis(200));
    let err = source.probe_total(&FilterSpec::unfiltered()).await.unwrap_err();
    assert!(matches!(err, SourceError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn test_fetch_detail_by_entity_id_joins_base_url() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/notices/v1/red/2019/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity_id": "2019/12345",
            "distinguishing_marks": "Tattoo"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let detail = source
        .fetch_detail(&DetailRef::EntityId("2019/12345".to_string()))
        .await
        .unwrap();
    assert_eq!(detail.text("distinguishing_marks"), "Tattoo");
}

#[tokio::test]
async fn test_fetch_detail_by_url_uses_link_verbatim() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/elsewhere/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entity_id": "77"})))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, |_| {});
    let url = format!("{}/elsewhere/77", server.uri());
    let detail = source.fetch_detail(&DetailRef::Url(url)).await.unwrap();
    assert_eq!(detail.entity_id(), "77");
}

#[tokio::test]
async fn test_requests_carry_browser_headers_and_cookie() {
    let Some(server) = start_mock_api().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(header("origin", "https://www.interpol.int"))
        .and(header("cookie", "session=abc"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, |config| {
        config.cookie = Some("session=abc".to_string());
    });
    assert_eq!(source.probe_total(&FilterSpec::unfiltered()).await.unwrap(), 7);
}
