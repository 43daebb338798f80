use super::*;

use crate::test_support::{closed_port_url, queries, spawn_playlist_service, Behavior};
use shared::error::ErrorKind;

fn client(base_url: &str) -> PlaylistBuildClient {
    PlaylistBuildClient::new(base_url, Duration::from_secs(5)).expect("client")
}

#[test]
fn inverted_bounds_are_rejected_before_any_io() {
    let err = prepare_request("Run!", "120", "100", "stegallej", &queries(&["genre:rock"]))
        .expect_err("min >= max");
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("must be below"));
}

#[test]
fn equal_bounds_are_rejected() {
    let err = prepare_request("Run!", "120", "120", "u", &queries(&["q"])).expect_err("equal");
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn non_numeric_and_non_positive_bounds_are_rejected() {
    for (min, max) in [
        ("fast", "120"),
        ("100", ""),
        ("NaN", "120"),
        ("0", "120"),
        ("-20", "120"),
        ("100", "inf"),
    ] {
        let err =
            prepare_request("Run!", min, max, "u", &queries(&["q"])).expect_err("invalid bound");
        assert_eq!(err.kind(), ErrorKind::Input, "min={min:?} max={max:?}");
    }
}

#[test]
fn blank_queries_and_user_are_rejected() {
    let err =
        prepare_request("Run!", "100", "120", "u", &queries(&["  ", ""])).expect_err("queries");
    assert_eq!(err.kind(), ErrorKind::Input);

    let err = prepare_request("Run!", "100", "120", "  ", &queries(&["q"])).expect_err("user");
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn blank_name_falls_back_and_description_is_synthesized() {
    let request = prepare_request(
        "   ",
        " 115 ",
        "135.5",
        "stegallej",
        &queries(&[" genre:rock ", "", "artist:Foo Fighters"]),
    )
    .expect("valid");

    assert_eq!(request.name, DEFAULT_PLAYLIST_NAME);
    assert_eq!(request.min_bpm, 115.0);
    assert_eq!(request.max_bpm, 135.5);
    assert_eq!(request.queries, queries(&["genre:rock", "artist:Foo Fighters"]));
    assert_eq!(
        request.description.as_deref(),
        Some("Tracks between 115 and 135.5 BPM")
    );
    assert_eq!(request.is_public, Some(false));
}

#[test]
fn base_url_keeps_path_prefix() {
    let client = client("http://10.0.0.5:5000/tempo/");
    let url = client.endpoint(BUILD_PLAYLIST_PATH).expect("endpoint");
    assert_eq!(url.as_str(), "http://10.0.0.5:5000/tempo/build_playlist");
}

#[test]
fn bare_host_is_accepted() {
    let client = client("76.72.29.135");
    assert_eq!(client.base_url().as_str(), "http://76.72.29.135/");
}

#[tokio::test]
async fn input_error_performs_no_network_call() {
    let (base_url, recorder) = spawn_playlist_service(Behavior::Accept).await;
    let err = client(&base_url)
        .build("Run!", "120", "100", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("input error");

    assert!(matches!(err, BuildError::Input(_)));
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn successful_build_returns_parsed_response() {
    let (base_url, recorder) = spawn_playlist_service(Behavior::Accept).await;
    let response = client(&base_url)
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock", "running tempo"]))
        .await
        .expect("build");

    assert_eq!(response.playlist_id.0, "abc");
    assert_eq!(response.added_count, 42);
    assert_eq!(response.min_bpm, 115.0);
    assert_eq!(response.max_bpm, 135.0);
    assert_eq!(response.bpm_stats.bpm_lookup_failed, 9);
    assert_eq!(recorder.hits(), 1);

    let sent = recorder.requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id.0, "stegallej");
    assert_eq!(sent[0].queries, queries(&["genre:rock", "running tempo"]));
    assert_eq!(
        sent[0].description.as_deref(),
        Some("Tracks between 115 and 135 BPM")
    );
}

#[tokio::test]
async fn http_500_maps_to_remote_error_with_body() {
    let (base_url, recorder) = spawn_playlist_service(Behavior::Reject).await;
    let err = client(&base_url)
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("remote error");

    match &err {
        BuildError::Remote { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "db offline");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(err.user_message().contains("db offline"));
    // no automatic retry
    assert_eq!(recorder.hits(), 1);
}

#[tokio::test]
async fn slow_service_maps_to_timeout() {
    let (base_url, recorder) =
        spawn_playlist_service(Behavior::Slow(Duration::from_millis(1_500))).await;
    let client = PlaylistBuildClient::new(&base_url, Duration::from_millis(200)).expect("client");

    let err = client
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("timeout");

    assert!(matches!(err, BuildError::Timeout(budget) if budget == Duration::from_millis(200)));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(
        err.user_message(),
        "The playlist service took longer than 0.2 seconds. Try again."
    );
    assert_eq!(recorder.hits(), 1);
}

#[test]
fn zero_timeout_is_rejected_at_construction() {
    let err = PlaylistBuildClient::new("http://127.0.0.1:5000", Duration::ZERO)
        .expect_err("zero timeout");
    assert!(err.to_string().contains("greater than zero"));
}

#[tokio::test]
async fn zero_timeout_in_settings_still_reaches_the_service() {
    let (base_url, recorder) = spawn_playlist_service(Behavior::Accept).await;
    let settings = Settings {
        service_url: base_url,
        request_timeout_secs: 0,
        ..Settings::default()
    };
    let client = PlaylistBuildClient::from_settings(&settings).expect("client");
    assert_eq!(client.timeout(), DEFAULT_REQUEST_TIMEOUT);

    client
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect("build");
    assert_eq!(recorder.hits(), 1);
}

#[tokio::test]
async fn garbled_body_maps_to_protocol_error() {
    let (base_url, _) = spawn_playlist_service(Behavior::Garbled).await;
    let err = client(&base_url)
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("protocol error");
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn kept_above_total_maps_to_protocol_error() {
    let (base_url, _) = spawn_playlist_service(Behavior::InconsistentStats).await;
    let err = client(&base_url)
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("protocol error");
    assert!(matches!(err, BuildError::Protocol(ref reason) if reason.contains("kept")));
}

#[tokio::test]
async fn unreachable_service_maps_to_transport_error() {
    let base_url = closed_port_url().await;
    let err = client(&base_url)
        .build("Run!", "115", "135", "stegallej", &queries(&["genre:rock"]))
        .await
        .expect_err("transport error");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn ping_reports_healthy_service() {
    let (base_url, _) = spawn_playlist_service(Behavior::Accept).await;
    client(&base_url).ping().await.expect("ping");
}
