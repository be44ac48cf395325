mod common;

use common::{news_json, TestApp, ADMIN_EMAIL, TEST_SECRET};
use serde_json::Value;

async fn list_news(app: &TestApp) -> Vec<Value> {
    let body: Value = app
        .client()
        .get(app.url("/news"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    body["news"].as_array().cloned().expect("news array")
}

#[tokio::test]
async fn news_are_listed_newest_first() {
    let app = TestApp::spawn().await;

    assert_eq!(app.put_news(news_json("A")).await.status(), 200);
    assert_eq!(app.put_news(news_json("B")).await.status(), 200);

    let news = list_news(&app).await;
    assert_eq!(news.len(), 2);
    assert_eq!(news[0]["title"], "B");
    assert_eq!(news[1]["title"], "A");
    assert_eq!(news[0]["occurrence"], "2018-03-01T14:05:00");
    assert_eq!(news[0]["imageUrl"], "https://example.com/image.png");

    app.cleanup().await;
}

#[tokio::test]
async fn inserted_news_is_pushed_and_announced() {
    let app = TestApp::spawn().await;
    app.client()
        .post(app.url("/notification/register"))
        .json(&serde_json::json!({ "token": "device-1", "type": "Android" }))
        .send()
        .await
        .expect("Failed to execute request");

    app.put_news(news_json("Launch")).await;

    let pushes = app.sent_pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].text, "Launch");
    assert_eq!(pushes[0].url, "https://example.com/article");

    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipients, vec![ADMIN_EMAIL.to_string()]);

    app.cleanup().await;
}

#[tokio::test]
async fn put_with_id_updates_existing_news() {
    let app = TestApp::spawn().await;
    app.put_news(news_json("Draft")).await;
    let id = list_news(&app).await[0]["id"].as_i64().expect("id");

    let mut updated = news_json("Final");
    updated["id"] = id.into();
    assert_eq!(app.put_news(updated).await.status(), 200);

    let news = list_news(&app).await;
    assert_eq!(news.len(), 1);
    assert_eq!(news[0]["title"], "Final");

    let single: Value = app
        .client()
        .get(app.url(&format!("/news/{}", id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(single["title"], "Final");

    app.cleanup().await;
}

#[tokio::test]
async fn updating_unknown_news_is_not_found() {
    let app = TestApp::spawn().await;

    let mut news = news_json("Ghost");
    news["id"] = 999.into();
    let response = app.put_news(news).await;

    assert_eq!(response.status(), 404);
    assert!(list_news(&app).await.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn unknown_news_id_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .get(app.url("/news/42"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_news_body_names_expected_type() {
    let app = TestApp::spawn().await;

    let response = app
        .client()
        .put(app.url("/news"))
        .header("Secret-hash", TEST_SECRET)
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let text = response.text().await.expect("body");
    assert!(text.contains("News"), "unexpected message: {}", text);
    assert!(list_news(&app).await.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn publishing_requires_secret() {
    let app = TestApp::spawn().await;

    for secret in [None, Some("wrong")] {
        let mut request = app.client().put(app.url("/news")).json(&news_json("Nope"));
        if let Some(secret) = secret {
            request = request.header("Secret-hash", secret);
        }
        let response = request.send().await.expect("Failed to execute request");
        assert_eq!(response.status(), 403);
    }

    assert!(list_news(&app).await.is_empty());
    assert!(app.sent_pushes().is_empty());

    app.cleanup().await;
}
