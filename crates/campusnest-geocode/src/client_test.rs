use super::*;

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::with_base_url("campusnest-test/0.1", 5, base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_constructs_search_query_string() {
    let client = test_client("https://nominatim.example");
    let url = client
        .build_url("search", &[("q", "Edmonton"), ("limit", "1")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://nominatim.example/search?q=Edmonton&limit=1&format=json"
    );
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("https://geo.example/nominatim/");
    let url = client.build_url("reverse", &[("lat", "1"), ("lon", "2")]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://geo.example/nominatim/reverse?lat=1&lon=2&format=json"
    );
}

#[test]
fn build_url_encodes_special_characters() {
    let client = test_client("https://nominatim.example");
    let url = client
        .build_url("search", &[("q", "123 Main St & 4th Ave")])
        .unwrap();
    assert!(
        url.as_str().contains("123+Main+St+%26+4th+Ave"),
        "query param should be percent-encoded: {url}"
    );
}

#[test]
fn build_url_appends_contact_email_when_set() {
    let client = test_client("https://nominatim.example").with_email("ops@campusnest.example");
    let url = client.build_url("search", &[("q", "x")]).unwrap();
    assert!(url.as_str().ends_with("&email=ops%40campusnest.example"), "{url}");
}

#[test]
fn blank_user_agent_is_rejected() {
    let result = NominatimClient::with_base_url("  ", 5, "https://nominatim.example");
    assert!(matches!(result, Err(GeocodeError::InvalidInput(_))));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = NominatimClient::with_base_url("ua", 5, "not a url");
    assert!(matches!(result, Err(GeocodeError::InvalidInput(_))));
}

#[test]
fn from_settings_carries_email() {
    let settings = GeocoderSettings {
        base_url: "https://nominatim.example".to_owned(),
        user_agent: "campusnest-test/0.1".to_owned(),
        email: Some("ops@campusnest.example".to_owned()),
        request_timeout_secs: 10,
        min_interval_ms: 1100,
    };
    let client = NominatimClient::from_settings(&settings).unwrap();
    assert_eq!(client.email.as_deref(), Some("ops@campusnest.example"));
    assert_eq!(client.base_url.as_str(), "https://nominatim.example/");
}
