mod common;

use std::sync::Arc;
use tokio::time::Duration;

use smartsession_lib::api::ApiClient;
use smartsession_lib::capture::{encode::decode_frame_data_uri, AcquireError, CameraView, SyntheticCamera};
use smartsession_lib::connection::{Connection, CONNECT_DELAY};
use smartsession_lib::models::{FramePayload, StudentIdentity};
use smartsession_lib::student::{BackendStatus, StudentApp};

#[tokio::test]
async fn submit_frame_posts_camel_case_payload() {
    let (stub, config) = common::spawn_backend().await;
    let api = ApiClient::new(&config).unwrap();

    let payload = FramePayload::new(&StudentIdentity::default(), "data:image/jpeg;base64,AAAA".into());
    let status = api.submit_frame(&payload).await.unwrap();
    assert!(status.is_success());

    let frames = stub.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["studentId"], "S1");
    assert_eq!(frames[0]["sessionId"], "LIVE_SESSION");
    assert_eq!(frames[0]["frameData"], "data:image/jpeg;base64,AAAA");
}

#[tokio::test]
async fn captured_frames_reach_the_backend() {
    let (stub, config) = common::spawn_backend().await;
    let api = ApiClient::new(&config).unwrap();

    let connection = Connection::new();
    connection.connect(&config.socket_url("ws/student"));
    let app = StudentApp::new(api, StudentIdentity::default()).with_connection(connection.clone());

    let camera = SyntheticCamera::new().with_dimensions(64, 48);
    let mut view = CameraView::new(Arc::new(camera.clone()));
    view.start(Arc::new(app.clone())).unwrap();

    tokio::time::sleep(CONNECT_DELAY + Duration::from_millis(600)).await;
    view.stop().await.unwrap();
    // Let fire-and-forget submissions settle.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let frames = stub.frames();
    assert!(!frames.is_empty());
    let jpeg = decode_frame_data_uri(frames[0]["frameData"].as_str().unwrap()).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));

    let state = app.snapshot();
    assert_eq!(state.backend_status, BackendStatus::Connected);
    assert!(state.last_frame_size > 0);
    assert!(state.camera_error.is_none());
    assert!(connection.stats().messages_sent > 0);
    assert_eq!(camera.stop_count(), 1);

    app.shutdown();
    connection.shutdown();
}

#[tokio::test]
async fn missing_camera_surfaces_as_student_error() {
    let config = common::unreachable_config().await;
    let app = StudentApp::new(ApiClient::new(&config).unwrap(), StudentIdentity::default());

    let camera = SyntheticCamera::new().failing_with(AcquireError::NotFound);
    let mut view = CameraView::new(Arc::new(camera));
    view.start(Arc::new(app.clone())).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    view.stop().await.unwrap();

    let state = app.snapshot();
    assert_eq!(state.camera_error.as_deref(), Some("No camera device found."));
    assert_eq!(state.debug_line(), "[ERROR] No camera device found.");
    assert_eq!(state.backend_status, BackendStatus::Checking);
}
