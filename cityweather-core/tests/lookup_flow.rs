//! End-to-end lookup against mocked geocoding and weather services.

use chrono::NaiveDate;
use cityweather_core::{
    Config, FetchOutcome, GeoDbClient, LookupSession, MonthlyPeriod, Place, ProviderConfig,
    ProviderId, SearchOutcome, WeatherState, provider::provider_from_config,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mocked(server: &MockServer, host: &str) -> ProviderConfig {
    let mut config = ProviderConfig::new("test-key", host);
    config.base_url = Some(server.uri());
    config
}

async fn mount_geodb(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/geo/cities"))
        .and(query_param("namePrefix", "Porto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"name": "Porto Alegre", "city": "Porto Alegre", "latitude": -30.03, "longitude": -51.23},
                {"name": "Porto", "city": "Porto", "latitude": 41.15, "longitude": -8.61},
                {"name": "Porto Alegre", "city": "Porto Alegre", "latitude": -30.03, "longitude": -51.23}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_select_and_fetch_monthly() {
    let server = MockServer::start().await;
    mount_geodb(&server).await;

    Mock::given(method("GET"))
        .and(path("/point/monthly"))
        .and(query_param("lat", "41.15"))
        .and(query_param("lon", "-8.61"))
        .and(query_param("start", "2023-10-29"))
        .and(query_param("end", "2023-10-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"tavg": 17.2, "tmin": 12.9, "tmax": 21.4, "prcp": 140.3, "wspd": 11.6}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.geocoding = Some(mocked(&server, "wft-geo-db.p.rapidapi.com"));
    config.upsert_provider(ProviderId::Monthly, mocked(&server, "meteostat.p.rapidapi.com"));
    config.monthly_period = Some(
        MonthlyPeriod::new(
            NaiveDate::from_ymd_opt(2023, 10, 29).unwrap(),
            NaiveDate::from_ymd_opt(2023, 10, 30).unwrap(),
        )
        .unwrap(),
    );

    let directory = GeoDbClient::new(config.geocoding_config().unwrap().clone());
    let provider = provider_from_config(ProviderId::Monthly, &config).unwrap();
    let mut session = LookupSession::new();

    let outcome = session.search(&directory, "Porto").await.unwrap();
    assert_eq!(outcome, SearchOutcome::Replaced(2));

    let selected = session.select_option(1).cloned().unwrap();
    assert_eq!(selected, Place::with_coordinates("Porto", 41.15, -8.61));

    let outcome = session.fetch_weather(provider.as_ref()).await.unwrap();
    let FetchOutcome::Updated(summary) = outcome else {
        panic!("expected updated weather, got {outcome:?}");
    };
    assert_eq!(summary.temperature, 17.2);
    assert_eq!(summary.wind_speed, Some(11.6));
    assert_eq!(session.weather(), &WeatherState::Ready(summary));
}

#[tokio::test]
async fn raw_city_with_current_conditions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/city/Recife"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 86.0, "temp_min": 77.0, "temp_max": 91.4}
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.upsert_provider(ProviderId::Current, mocked(&server, "weather.example"));
    let provider = provider_from_config(ProviderId::Current, &config).unwrap();

    let mut session = LookupSession::new();
    session.select(Place::named("Recife"));
    session.fetch_weather(provider.as_ref()).await.unwrap();

    match session.weather() {
        WeatherState::Ready(summary) => {
            assert_eq!(summary.temperature, 30.0);
            assert_eq!(summary.min_temperature, 25.0);
            assert_eq!(summary.max_temperature, 33.0);
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn provider_outage_returns_session_to_idle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/city/Recife"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.upsert_provider(ProviderId::Current, mocked(&server, "weather.example"));
    let provider = provider_from_config(ProviderId::Current, &config).unwrap();

    let mut session = LookupSession::new();
    session.select(Place::named("Recife"));
    let err = session.fetch_weather(provider.as_ref()).await.unwrap_err();

    assert!(!session.is_loading());
    assert_eq!(session.weather(), &WeatherState::Failed(err.user_message()));
}
