//! Alert scheduler ticks against a mock upstream and a recording sink.

use std::sync::Arc;

use valopro_core::render::UPCOMING_COLOR;
use valopro_core::{AlertScheduler, AlertSettings, VlrClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::{RecordingSink, StaticFeed, envelope, start_mock_server_or_skip, upcoming_segment};

const NOW: i64 = 1_800_000_000;
const CHANNEL: u64 = 112_233_445_566;

fn settings() -> AlertSettings {
    AlertSettings {
        channel_id: Some(CHANNEL),
        ..AlertSettings::default()
    }
}

#[tokio::test]
async fn test_tick_posts_matches_inside_lead_window_once() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/match"))
        .and(query_param("q", "upcoming"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![
            upcoming_segment("10", "Sentinels", "LOUD", "Masters", NOW + 20 * 60),
            upcoming_segment("11", "FNATIC", "NAVI", "Masters", NOW + 2 * 3600),
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = AlertScheduler::new(
        Arc::new(VlrClient::with_base_url(&mock_server.uri()).unwrap()),
        sink.clone(),
        settings(),
    );

    let first = scheduler.tick(NOW).await;
    let second = scheduler.tick(NOW + 600).await;

    assert_eq!(first.announced, 1);
    assert_eq!(second.announced, 0);
    let posted = sink.posted();
    assert_eq!(posted.len(), 1);
    let (channel, card) = &posted[0];
    assert_eq!(*channel, CHANNEL);
    assert_eq!(card.title, "Sentinels vs LOUD");
    assert_eq!(card.color, UPCOMING_COLOR);
    assert_eq!(card.field.as_ref().unwrap().value, "20m");
}

#[tokio::test]
async fn test_upstream_error_skips_tick_and_next_tick_recovers() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![
            upcoming_segment("20", "DRX", "T1", "Pacific", NOW + 60),
        ])))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = AlertScheduler::new(
        Arc::new(VlrClient::with_base_url(&mock_server.uri()).unwrap()),
        sink.clone(),
        settings(),
    );

    assert!(scheduler.tick(NOW).await.skipped);
    assert!(sink.posted().is_empty());

    let report = scheduler.tick(NOW).await;
    assert!(!report.skipped);
    assert_eq!(report.announced, 1);
    assert!(scheduler.announced().contains("20"));
}

#[tokio::test]
async fn test_lead_window_edges() {
    let lead = i64::try_from(settings().lead.as_secs()).unwrap();
    let feed = StaticFeed::new(
        vec![],
        vec![
            upcoming_segment("edge", "Edge", "A", "E", NOW + lead),
            upcoming_segment("beyond", "Beyond", "B", "E", NOW + lead + 1),
        ],
    );
    let sink = Arc::new(RecordingSink::default());
    let scheduler = AlertScheduler::new(Arc::new(feed), sink.clone(), settings());

    scheduler.tick(NOW).await;

    let titles: Vec<String> = sink.posted().into_iter().map(|(_, card)| card.title).collect();
    assert_eq!(titles, vec!["Edge vs A".to_string()]);
}

#[tokio::test]
async fn test_disabled_alerts_never_fetch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let scheduler = AlertScheduler::new(
        Arc::new(VlrClient::with_base_url(&mock_server.uri()).unwrap()),
        sink,
        AlertSettings::default(),
    );

    assert!(scheduler.tick(NOW).await.skipped);
}
