mod common;

use anyhow::Result;
use axum::http::StatusCode;
use rastarockets_api::database::models::UserRole;

use common::TestApp;

fn names(payload: &serde_json::Value, key: &str) -> Vec<String> {
    payload["data"][key]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v["name"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn customers_match_on_prefix() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    for name in ["BNP PARIBAS", "BNP NTM", "ORANGE"] {
        app.add_customer(name).await?;
    }

    let res = app.get("/api/customers/?name=bnp", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let mut found = names(&res.json(), "customers");
    found.sort();
    assert_eq!(found, vec!["BNP NTM", "BNP PARIBAS"]);

    let first = &res.json()["data"]["customers"][0];
    assert!(first["id"].is_string());
    Ok(())
}

#[tokio::test]
async fn autocomplete_is_capped_at_ten() -> Result<()> {
    let app = TestApp::spawn().await?;
    for i in 0..12 {
        app.add_customer(&format!("ACME {}", i)).await?;
    }

    let res = app.get("/api/customers?name=acme", Some(&app.token())).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.json(), "customers").len(), 10);
    Ok(())
}

#[tokio::test]
async fn empty_name_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();

    for uri in [
        "/api/customers/?name=",
        "/api/customers/",
        "/api/contacts/?name=",
        "/api/consultants/",
    ] {
        let res = app.get(uri, Some(&token)).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(res.json()["error"], "name can't be empty");
    }
    Ok(())
}

#[tokio::test]
async fn contacts_can_be_scoped_to_a_customer() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.token();
    let bnp = app.add_customer("BNP PARIBAS").await?;
    let orange = app.add_customer("ORANGE").await?;
    app.add_contact(&bnp, "Paul Martin").await?;
    app.add_contact(&orange, "Pauline Durand").await?;

    let res = app.get("/api/contacts/?name=pau", Some(&token)).await?;
    assert_eq!(names(&res.json(), "contacts").len(), 2);

    let uri = format!("/api/contacts/?name=pau&customer_id={}", bnp.id);
    let res = app.get(&uri, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.json(), "contacts"), vec!["Paul Martin"]);
    Ok(())
}

#[tokio::test]
async fn only_consultants_are_suggested() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.add_user("marc@rastarockets.io", "Marc Lefort", UserRole::Consultant).await?;
    app.add_user("marie@rastarockets.io", "Marie Leroy", UserRole::Other).await?;

    let res = app.get("/api/consultants/?name=mar", Some(&app.token())).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.json(), "consultants"), vec!["Marc Lefort"]);
    Ok(())
}
