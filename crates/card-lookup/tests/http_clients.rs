use card_lookup::{
    CardDetails, CardSearch, LookupConfig, LookupError, MultiverseBridgeClient, ScryfallClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> LookupConfig {
    LookupConfig::new(&server.uri(), &server.uri()).with_timeout_secs(5)
}

#[tokio::test]
async fn test_search_sends_card_name_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cards/search"))
        .and(query_param("name", "Delver of Secrets // Insectile Aberration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "edition": "Innistrad", "scryfall_id": "id-isd", "foil": false },
            { "edition": "Innistrad Remastered", "scryfall_id": "id-inr" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = MultiverseBridgeClient::new(&config_for(&server)).unwrap();
    let candidates = client
        .search_by_name("Delver of Secrets // Insectile Aberration")
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].edition, "Innistrad");
    assert_eq!(candidates[1].scryfall_id, "id-inr");
}

#[tokio::test]
async fn test_search_empty_result_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cards/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = MultiverseBridgeClient::new(&config_for(&server)).unwrap();
    let candidates = client.search_by_name("Nonexistent").await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_search_non_success_status_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cards/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = MultiverseBridgeClient::new(&config_for(&server)).unwrap();
    let err = client.search_by_name("Anything").await.unwrap_err();
    assert!(matches!(
        err,
        LookupError::Status { service: "multiversebridge", status: 503, .. }
    ));
}

#[tokio::test]
async fn test_search_malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cards/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
        .mount(&server)
        .await;

    let client = MultiverseBridgeClient::new(&config_for(&server)).unwrap();
    let err = client.search_by_name("Anything").await.unwrap_err();
    assert!(matches!(err, LookupError::Decode { service: "multiversebridge", .. }));
}

#[tokio::test]
async fn test_detail_fetches_card_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/id-isd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "id-isd",
            "name": "Delver of Secrets // Insectile Aberration",
            "card_faces": [
                { "name": "Delver of Secrets", "image_uris": { "normal": "https://img/front.jpg" } },
                { "name": "Insectile Aberration", "image_uris": { "normal": "https://img/back.jpg" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ScryfallClient::new(&config_for(&server)).unwrap();
    let record = client.card_by_id("id-isd").await.unwrap();

    assert!(record.is_double_faced());
    assert_eq!(
        record.normal_image_uris().unwrap(),
        vec!["https://img/front.jpg", "https://img/back.jpg"]
    );
}

#[tokio::test]
async fn test_detail_not_found_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ScryfallClient::new(&config_for(&server)).unwrap();
    let err = client.card_by_id("missing").await.unwrap_err();
    assert!(matches!(err, LookupError::Status { service: "scryfall", status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_service_maps_to_http_error() {
    // Port 9 (discard) is not served by anything in the test environment.
    let config = LookupConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9").with_timeout_secs(2);
    let client = ScryfallClient::new(&config).unwrap();
    let err = client.card_by_id("abc").await.unwrap_err();
    assert!(matches!(err, LookupError::Http(_)));
}
