//! NASA Exoplanet Archive client against the checked-in fixtures.

mod support;

use skyquery::config::ClientConfig;
use skyquery::exoplanet::{NasaExoplanetArchive, QueryCriteria, Route};
use skyquery::replay::{FixtureStore, GenerateMode, ReplayTransport};
use skyquery::QueryError;

/// Tables still served by the legacy API, with the criteria they were
/// recorded with.
fn api_tables() -> Vec<(&'static str, QueryCriteria)> {
    let kepid = || QueryCriteria::new().where_clause("kepid=10601284");
    let kelt = || {
        QueryCriteria::new()
            .where_clause("kelt_sourceid='KELT_N02_lc_012738_V01_east'")
            .param("kelt_field", "N02")
    };

    vec![
        ("cumulative", kepid()),
        ("koi", kepid()),
        ("q1_q17_dr25_sup_koi", kepid()),
        ("q1_q17_dr25_koi", kepid()),
        ("q1_q17_dr24_koi", kepid()),
        ("q1_q16_koi", kepid()),
        ("q1_q12_koi", kepid()),
        ("q1_q8_koi", kepid()),
        ("q1_q6_koi", kepid()),
        ("tce", kepid()),
        ("q1_q17_dr25_tce", kepid()),
        ("q1_q17_dr24_tce", kepid()),
        ("q1_q16_tce", kepid()),
        ("q1_q12_tce", kepid()),
        ("keplerstellar", kepid()),
        ("q1_q17_dr25_supp_stellar", kepid()),
        ("q1_q17_dr25_stellar", kepid()),
        ("q1_q17_dr24_stellar", kepid()),
        ("q1_q16_stellar", kepid()),
        ("q1_q12_stellar", kepid()),
        (
            "keplertimeseries",
            QueryCriteria::new().param("kepid", 8561063).param("quarter", 14),
        ),
        ("kelttimeseries", kelt()),
        ("kelt", kelt()),
        (
            "superwasptimeseries",
            QueryCriteria::new().param("sourceid", "1SWASP J191645.46+474912.3"),
        ),
        (
            "k2targets",
            QueryCriteria::new().where_clause("epic_number=206027655"),
        ),
        (
            "k2candidates",
            QueryCriteria::new().where_clause("epic_name='EPIC 206027655'"),
        ),
        (
            "missionstars",
            QueryCriteria::new().where_clause("star_name='tau Cet'"),
        ),
        (
            "mission_exocat",
            QueryCriteria::new().where_clause("star_name='HIP 5110 A'"),
        ),
        ("toi", QueryCriteria::new().where_clause("toi=256.01")),
    ]
}

fn replay<'s>(store: &'s FixtureStore, config: &ClientConfig) -> ReplayTransport<'s> {
    ReplayTransport::new(store, config.exoplanet.url_api.as_str())
        .with_generate_mode(GenerateMode::Disabled)
}

fn archive<'s>(
    store: &'s FixtureStore,
    config: &ClientConfig,
) -> NasaExoplanetArchive<ReplayTransport<'s>> {
    // A TAP table list that matches none of the API tables keeps every query
    // on the legacy endpoint.
    NasaExoplanetArchive::new(replay(store, config), config).with_tap_tables(["list"])
}

/// Every legacy API table replays with rows and fully recognised units.
#[tokio::test]
async fn test_api_tables() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    for (table, criteria) in api_tables() {
        let data = client
            .query_criteria(table, &criteria)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", table, e));
        assert!(!data.is_empty(), "{} returned no rows", table);
        assert!(
            data.unrecognized_units().is_empty(),
            "{} has unrecognised units: {:?}",
            table,
            data.unrecognized_units()
        );
    }
}

/// Cells and positions come through from the recorded body.
#[tokio::test]
async fn test_koi_fixture_contents() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    let koi = client
        .query_criteria("koi", &QueryCriteria::new().where_clause("kepid=10601284"))
        .await
        .unwrap();
    assert_eq!(koi.len(), 1);
    assert_eq!(koi.value(0, "kepid"), Some("10601284"));
    assert_eq!(koi.meta.get("fixlen").map(String::as_str), Some("T"));

    let positions = koi.sky_positions().unwrap().unwrap();
    let position = positions[0].unwrap();
    assert!((position.ra().value() - 291.1478).abs() < 1e-9);
    assert!((position.dec().value() - 47.7745).abs() < 1e-9);

    let series = client
        .query_criteria(
            "keplertimeseries",
            &QueryCriteria::new().param("kepid", 8561063).param("quarter", 14),
        )
        .await
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.value(1, "obsmode"), Some("short cadence"));
}

/// The helpers of the old interface hit retired tables and fail loudly.
#[tokio::test]
#[allow(deprecated)]
async fn test_backwards_compat() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    for name in ["HD 209458 b ", "HD 209458 b"] {
        let err = client.query_planet(name).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidTable { .. }));
        assert!(err.to_string().contains("replaced"));
    }
    for name in ["HD 209458", "HD 136352"] {
        let err = client.query_star(name).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidTable { .. }));
        assert!(err.to_string().contains("replaced"));
    }
}

#[tokio::test]
async fn test_regularize_object_name() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    assert_eq!(
        client.regularize_object_name("kepler 2").await.unwrap(),
        "HAT-P-7"
    );
    assert_eq!(
        client.regularize_object_name("kepler 1 b").await.unwrap(),
        "TrES-2 b"
    );
    assert_eq!(
        client.regularize_object_name("not a planet").await.unwrap(),
        "not a planet"
    );
}

#[tokio::test]
async fn test_aliastable_lists_default_name_first() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    let aliases = client.query_aliastable("kepler 2").await.unwrap();
    assert_eq!(aliases.first().map(String::as_str), Some("HAT-P-7"));
    assert!(aliases.iter().any(|a| a == "Kepler-2"));
}

/// A query nobody recorded is a stale-fixture failure, not a network call.
#[tokio::test]
async fn test_unrecorded_query_is_missing_fixture() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config);

    let err = client
        .query_criteria("koi", &QueryCriteria::new().where_clause("kepid=11446443"))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::MissingFixture { .. }));
    let context = err.context();
    assert_eq!(context.table.as_deref(), Some("koi"));
    assert!(context
        .details
        .as_deref()
        .unwrap()
        .contains("where=kepid%3D11446443"));
}

#[tokio::test]
async fn test_select_list_payload() {
    let config = ClientConfig::default();
    let store = support::checked_in_store();
    let client = archive(&store, &config).with_tap_tables(["ps"]);

    let criteria = QueryCriteria::new()
        .select_columns(["hostname", "pl_name"])
        .where_clause("hostname='Kepler-11'");
    let payload = client.query_criteria_payload("ps", &criteria).await.unwrap();
    assert_eq!(payload.route, Route::Tap);
    assert_eq!(
        payload.get("query"),
        Some("select hostname,pl_name from ps where hostname='Kepler-11'")
    );

    let payload = client.query_criteria_payload("koi", &criteria).await.unwrap();
    assert_eq!(payload.route, Route::Api);
    assert_eq!(payload.get("select"), Some("hostname,pl_name"));
}
