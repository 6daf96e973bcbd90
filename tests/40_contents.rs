mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use rastarockets_api::database::models::UserRole;
use serde_json::json;

use common::TestApp;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

async fn need_for(app: &TestApp, token: &str) -> Result<String> {
    let customer = app.add_customer("THALES").await?;
    let contact = app.add_contact(&customer, "Lucie Bernard").await?;
    let res = app
        .post_json(
            "/api/needs/",
            Some(token),
            json!({
                "title": "Radar tooling",
                "customer": customer.id,
                "contact": contact.id,
                "description": "Embedded tooling",
                "status": "open"
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.json());
    Ok(res.json()["data"]["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn upload_download_and_delete() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;
    let collection = format!("/api/needs/{}/contents", need_id);

    let res = app.upload(&collection, &token, "diagram.png", PNG_BYTES).await?;
    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.json());
    let content = res.json()["data"].clone();
    assert_eq!(content["filename"], "diagram.png");
    assert_eq!(content["need"], need_id.as_str());
    assert!(app.state.config.uploads.folder.join("diagram.png").exists());

    let item = format!("{}/{}", collection, content["id"].as_str().unwrap_or_default());
    let res = app.get(&item, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::CONTENT_TYPE], "image/png");
    assert!(res.headers[header::CONTENT_DISPOSITION]
        .to_str()?
        .contains("diagram.png"));
    assert_eq!(res.bytes, PNG_BYTES);

    let res = app.delete(&item, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(!app.state.config.uploads.folder.join("diagram.png").exists());

    let res = app.get(&item, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn disallowed_extension_writes_nothing() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;

    let uri = format!("/api/needs/{}/contents", need_id);
    let res = app.upload(&uri, &token, "contract.pdf", b"%PDF-1.4").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "File not allowed");
    assert!(!app.state.config.uploads.folder.join("contract.pdf").exists());
    Ok(())
}

#[tokio::test]
async fn name_collision_is_a_conflict() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;
    let uri = format!("/api/needs/{}/contents/", need_id);

    let first = app.upload(&uri, &token, "photo.jpg", b"first").await?;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.upload(&uri, &token, "photo.jpg", b"second").await?;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.json()["error"], "File photo.jpg already exist");

    let on_disk = std::fs::read(app.state.config.uploads.folder.join("photo.jpg"))?;
    assert_eq!(on_disk, b"first");
    Ok(())
}

#[tokio::test]
async fn path_components_are_stripped() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;
    let uri = format!("/api/needs/{}/contents", need_id);

    let res = app.upload(&uri, &token, "../../escape.png", PNG_BYTES).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["data"]["filename"], "escape.png");
    assert!(app.state.config.uploads.folder.join("escape.png").exists());

    let res = app.upload(&uri, &token, "..", PNG_BYTES).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn failed_record_removes_the_file() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;

    app.store.set_reject_writes(true);
    let uri = format!("/api/needs/{}/contents", need_id);
    let res = app.upload(&uri, &token, "lost.png", PNG_BYTES).await?;
    app.store.set_reject_writes(false);

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Unable to save content");
    assert!(!app.state.config.uploads.folder.join("lost.png").exists());
    Ok(())
}

#[tokio::test]
async fn missing_file_drops_the_record() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;
    let collection = format!("/api/needs/{}/contents", need_id);

    let res = app.upload(&collection, &token, "gone.png", PNG_BYTES).await?;
    let content_id = res.json()["data"]["id"].as_str().unwrap_or_default().to_string();
    std::fs::remove_file(app.state.config.uploads.folder.join("gone.png"))?;

    let item = format!("{}/{}", collection, content_id);
    let res = app.get(&item, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Need have no content");

    assert!(app.state.needs.get_need_content_by_id(&content_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn contents_follow_need_ownership() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;
    let collection = format!("/api/needs/{}/contents", need_id);
    let res = app.upload(&collection, &token, "private.png", PNG_BYTES).await?;
    let item = format!("{}/{}", collection, res.json()["data"]["id"].as_str().unwrap_or_default());

    let other = app.add_user("eve@rastarockets.io", "Eve", UserRole::Other).await?;
    let other_token = app.token_for(&other);

    assert_eq!(app.get(&item, Some(&other_token)).await?.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&item, Some(&other_token)).await?.status, StatusCode::NOT_FOUND);
    let res = app.upload(&collection, &other_token, "intrude.png", PNG_BYTES).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // A content id reached through a different need is not found either
    let second_need = need_for(&app, &token).await?;
    let wrong = item.replace(&need_id, &second_need);
    assert_eq!(app.get(&wrong, Some(&token)).await?.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let need_id = need_for(&app, &token).await?;

    let big = vec![0u8; 128 * 1024];
    let uri = format!("/api/needs/{}/contents", need_id);
    let res = app.upload(&uri, &token, "huge.png", &big).await?;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app.state.config.uploads.folder.join("huge.png").exists());
    Ok(())
}
