use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use terra::catalog::{CatalogClient, CatalogError, CatalogRequest, RestCountriesClient};
use terra::core::error::{
    BORDER_FETCH_MESSAGE, GENERAL_FETCH_MESSAGE, REGION_FETCH_MESSAGE, SEARCH_NOT_FOUND_MESSAGE,
};
use terra::core::preferences::Preferences;
use terra::{Directory, DirectorySettings, DirectoryView, Region};
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// A v3.1-shaped country record.
fn country(code: &str, name: &str, region: &str, borders: &[&str]) -> Value {
    json!({
        "cca3": code,
        "name": {
            "common": name,
            "official": name,
            "nativeName": { "xxx": { "official": name, "common": name } }
        },
        "region": region,
        "subregion": "",
        "capital": [format!("{name} City")],
        "population": 1_000_000,
        "tld": [format!(".{}", code[..2].to_lowercase())],
        "languages": { "xxx": "Language" },
        "currencies": { "XXX": { "name": "Currency", "symbol": "¤" } },
        "flags": { "png": "https://flagcdn.com/w320/xx.png", "svg": "https://flagcdn.com/xx.svg" },
        "borders": borders
    })
}

fn world() -> Value {
    json!([
        country("FRA", "France", "Europe", &["ESP", "DEU"]),
        country("JPN", "Japan", "Asia", &[]),
        country("PER", "Peru", "Americas", &["BOL", "CHL"]),
    ])
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn directory_for(server: &MockServer) -> Directory {
    let client = RestCountriesClient::new(Some(server.uri()), Some(Duration::from_secs(5))).unwrap();
    let settings = DirectorySettings {
        debounce: Duration::from_millis(50),
        ..DirectorySettings::default()
    };
    Directory::new(Arc::new(client), settings, Preferences::in_memory())
}

fn codes(list: Option<&[terra::Country]>) -> Vec<String> {
    list.unwrap_or_default().iter().map(|c| c.code.clone()).collect()
}

/// Waits (bounded) for the directory to publish a view matching `pred`.
async fn wait_for_view(directory: &Directory, pred: impl Fn(&DirectoryView) -> bool) -> DirectoryView {
    let mut updates = directory.subscribe();
    let view = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|v| pred(v)))
        .await
        .expect("timed out waiting for the directory")
        .expect("directory dropped");
    view.clone()
}

// ============================================================================
// REST Client Tests
// ============================================================================

#[tokio::test]
async fn test_client_fetches_raw_payload() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, world()).await;
    let client = RestCountriesClient::new(Some(server.uri()), None).unwrap();

    let payload = assert_ok!(client.fetch(&CatalogRequest::All).await);
    assert_eq!(payload.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_client_sends_codes_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alpha"))
        .and(query_param("codes", "ESP,DEU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let client = RestCountriesClient::new(Some(server.uri()), None).unwrap();

    assert_ok!(
        client
            .fetch(&CatalogRequest::Codes(vec!["ESP".into(), "DEU".into()]))
            .await
    );
}

#[tokio::test]
async fn test_client_maps_status_and_body_errors() {
    let server = MockServer::start().await;
    mount_json(&server, "/name/atlantis", 404, json!({ "status": 404, "message": "Not Found" })).await;
    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let client = RestCountriesClient::new(Some(server.uri()), None).unwrap();

    let missing = assert_err!(client.fetch(&CatalogRequest::Name("atlantis".into())).await);
    assert!(missing.is_not_found());
    let garbled = assert_err!(client.fetch(&CatalogRequest::All).await);
    assert!(matches!(garbled, CatalogError::Parse(_)));
}

#[tokio::test]
async fn test_client_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(world()).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let client =
        RestCountriesClient::new(Some(server.uri()), Some(Duration::from_millis(100))).unwrap();

    let err = assert_err!(client.fetch(&CatalogRequest::All).await);
    assert!(matches!(err, CatalogError::Network(_)));
}

// ============================================================================
// Directory Tests
// ============================================================================

#[tokio::test]
async fn test_search_then_borders_end_to_end() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, world()).await;
    mount_json(
        &server,
        "/name/france",
        200,
        json!([country("FRA", "France", "Europe", &["ESP", "DEU"])]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/alpha"))
        .and(query_param("codes", "ESP,DEU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            country("ESP", "Spain", "Europe", &["FRA", "PRT"]),
            country("DEU", "Germany", "Europe", &["FRA"]),
        ])))
        .mount(&server)
        .await;
    let directory = directory_for(&server);

    directory.initialize().await;
    assert_eq!(codes(directory.view().countries.as_deref()), vec!["FRA", "JPN", "PER"]);

    directory.set_input_value("France").await;
    directory.search_for_countries("France").await;
    let view = directory.view();
    assert!(!view.search_error.active);
    assert_eq!(codes(view.countries.as_deref()), vec!["FRA"]);

    let france = view.country("FRA").unwrap();
    assert_eq!(france.name, "France");
    assert_eq!(france.capital.as_deref(), Some("France City"));
    assert_eq!(france.flag, "https://flagcdn.com/xx.svg");

    directory.find_border_countries(france.borders.as_slice()).await;
    let view = directory.view();
    assert_eq!(codes(view.borders.as_deref()), vec!["ESP", "DEU"]);
    assert_eq!(codes(view.countries.as_deref()), vec!["FRA"]);
}

#[tokio::test]
async fn test_search_without_matches_reports_not_found() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, world()).await;
    mount_json(&server, "/name/xyzzynotacountry", 200, json!([])).await;
    mount_json(&server, "/name/atlantis", 404, json!({ "status": 404, "message": "Not Found" })).await;
    let directory = directory_for(&server);
    directory.fetch_all().await;

    for query in ["xyzzynotacountry", "atlantis"] {
        directory.set_input_value(query).await;
        directory.search_for_countries(query).await;
        let view = directory.view();
        assert!(view.search_error.active, "{query} should not be found");
        assert_eq!(view.search_error.message, SEARCH_NOT_FOUND_MESSAGE);
        assert!(!view.error.active);
        assert!(!view.is_loading);
    }
}

#[tokio::test]
async fn test_symbols_are_stripped_before_searching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/name/new%20zealand"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([country("NZL", "New Zealand", "Oceania", &[])])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let directory = directory_for(&server);

    directory.set_input_value("new zealand!!1").await;
    directory.search_for_countries("new zealand!!1").await;
    assert_eq!(codes(directory.view().countries.as_deref()), vec!["NZL"]);

    // Nothing searchable left: not found without a request.
    directory.set_input_value("123").await;
    directory.search_for_countries("123").await;
    let view = directory.view();
    assert!(view.search_error.active);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_typing_runs_one_debounced_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/name/japan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([country("JPN", "Japan", "Asia", &[])])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let directory = directory_for(&server);

    for partial in ["j", "ja", "jap", "japa", "japan"] {
        directory.input_changed(partial).await;
    }

    let view = wait_for_view(&directory, |v| v.search_query == "japan" && v.countries.is_some()).await;
    assert_eq!(codes(view.countries.as_deref()), vec!["JPN"]);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_region_filter_replaces_list() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, world()).await;
    mount_json(
        &server,
        "/region/asia",
        200,
        json!([country("JPN", "Japan", "Asia", &[])]),
    )
    .await;
    let directory = directory_for(&server);
    directory.fetch_all().await;

    directory.choose_region(Region::Asia).await;

    let view = directory.view();
    assert_eq!(view.selected, Region::Asia);
    assert_eq!(directory.load_region(), Region::Asia);
    assert_eq!(codes(view.countries.as_deref()), vec!["JPN"]);
    assert!(view.countries.as_deref().unwrap().iter().all(|c| c.region == Region::Asia.label()));
}

#[tokio::test]
async fn test_server_failures_raise_general_error() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 500, json!({ "message": "boom" })).await;
    mount_json(&server, "/region/europe", 503, json!({ "message": "busy" })).await;
    let directory = directory_for(&server);

    directory.fetch_all().await;
    let view = directory.view();
    assert!(view.error.active);
    assert_eq!(view.error.message, GENERAL_FETCH_MESSAGE);
    assert!(!view.is_loading);
    assert!(view.countries.is_none());

    directory.filter_by_region(Region::Europe).await;
    let view = directory.view();
    assert!(view.error.active);
    assert_eq!(view.error.message, REGION_FETCH_MESSAGE);
    assert!(!view.is_loading);
}

#[tokio::test]
async fn test_malformed_payload_raises_general_error() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, json!({ "status": 200, "data": "not a list" })).await;
    let directory = directory_for(&server);

    directory.fetch_all().await;

    let view = directory.view();
    assert!(view.error.active);
    assert!(!view.is_loading);
    assert!(view.countries.is_none());
}

#[tokio::test]
async fn test_border_failure_only_touches_border_channel() {
    let server = MockServer::start().await;
    mount_json(&server, "/all", 200, world()).await;
    mount_json(&server, "/alpha", 500, json!({ "message": "boom" })).await;
    let directory = directory_for(&server);
    directory.fetch_all().await;
    let before = directory.view();

    directory.find_border_countries(&["BOL", "CHL"]).await;

    let view = directory.view();
    assert!(view.border_error.active);
    assert_eq!(view.border_error.message, BORDER_FETCH_MESSAGE);
    assert!(view.borders.is_none());
    assert_eq!(view.countries, before.countries);
    assert!(!view.error.active);
    assert!(!view.search_error.active);
}
