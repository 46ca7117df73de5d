mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::{delete, get, post_json, put_json, TestApp};
use dyslexia_core::domain::MaterialKind;
use serde_json::json;
use uuid::Uuid;

//=========================================================================================
// Settings
//=========================================================================================

#[tokio::test]
async fn settings_default_then_merge_field_by_field() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, body) = app.send(get("/api/settings", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"]["fontFamily"], "Open Sans");
    assert_eq!(body["audio"]["voice"], "vi-VN-Standard-A");

    let (status, body) = app
        .send(put_json(
            "/api/settings/display",
            Some(&token),
            json!({ "fontSize": 20.0, "theme": "dark" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fontSize"], 20.0);
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["lineSpacing"], 1.8);

    let (_, body) = app
        .send(post_json("/api/settings", Some(&token), json!({ "audio": { "volume": 0.5 } })))
        .await;
    assert_eq!(body["audio"]["volume"], 0.5);
    assert_eq!(body["display"]["fontSize"], 20.0);
    assert_eq!(body["display"]["theme"], "dark");
}

#[tokio::test]
async fn settings_reject_unknown_fields_and_bad_values() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, _) = app
        .send(put_json("/api/settings/audio", Some(&token), json!({ "userId": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(put_json("/api/settings/audio", Some(&token), json!({ "volume": 1.5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(put_json("/api/settings/display", Some(&token), json!({ "fontSize": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.send(get("/api/settings/audio", Some(&token))).await;
    assert_eq!(body["volume"], 1.0);
}

//=========================================================================================
// Materials & Progress
//=========================================================================================

#[tokio::test]
async fn materials_are_public_to_read_but_protected_to_write() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, _) = app
        .send(post_json("/api/readings", None, json!({ "title": "Con mèo", "level": "A1" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(post_json(
            "/api/readings",
            Some(&token),
            json!({ "title": "Con mèo", "topic": "Động vật", "level": "A1", "content": "Con mèo ngủ." }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app.send(get(&format!("/api/readings/{}", id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "A1");

    // Readings and speakings are separate collections.
    let (status, _) = app.send(get(&format!("/api/speakings/{}", id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(put_json(&format!("/api/readings/{}", id), Some(&token), json!({ "level": "B1" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "B1");
    assert_eq!(body["title"], "Con mèo");

    let (status, _) = app.send(delete(&format!("/api/readings/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(delete(&format!("/api/readings/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn material_filters() {
    let app = TestApp::new();
    let token = app.register("lan").await;
    for (title, level) in [("Con mèo", "A1"), ("Con chó", "A2"), ("Mùa hè", "A1")] {
        app.send(post_json(
            "/api/speakings",
            Some(&token),
            json!({ "title": title, "level": level }),
        ))
        .await;
    }

    let (_, body) = app.send(get("/api/speakings?level=All", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app.send(get("/api/speakings?level=A1", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.send(get("/api/speakings?search=CON", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.send(get("/api/speakings?level=C2", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(post_json("/api/speakings", Some(&token), json!({ "title": "Thiếu cấp độ" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_material_id_uses_the_error_shape() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/api/readings/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = app.send(get("/api/speakings/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn progress_requires_an_existing_material_and_valid_percent() {
    let app = TestApp::new();
    let token = app.register("lan").await;
    let material = app.db.insert_material(MaterialKind::Speaking, "Con mèo", "Con mèo ngủ.");

    let (status, _) = app
        .send(post_json(
            "/api/speakings/progress",
            Some(&token),
            json!({ "materialId": Uuid::new_v4(), "percent": 50 }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(post_json(
            "/api/speakings/progress",
            Some(&token),
            json!({ "materialId": material, "percent": 101 }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(post_json(
            "/api/speakings/progress",
            Some(&token),
            json!({ "materialId": material, "percent": 80, "analysis": { "accuracy": 0.8 } }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "speaking");
    assert_eq!(body["materialTitle"], "Con mèo");
    assert_eq!(body["analysis"]["accuracy"], 0.8);
}

#[tokio::test]
async fn session_history_merges_both_kinds() {
    let app = TestApp::new();
    let token = app.register("lan").await;
    let reading = app.db.insert_material(MaterialKind::Reading, "Bài 1", "Nội dung");
    let speaking = app.db.insert_material(MaterialKind::Speaking, "Bài 2", "Nội dung");

    app.send(post_json(
        "/api/readings/progress",
        Some(&token),
        json!({ "materialId": reading, "percent": 100 }),
    ))
    .await;
    app.send(post_json(
        "/api/speakings/progress",
        Some(&token),
        json!({ "materialId": speaking, "percent": 60 }),
    ))
    .await;

    let (status, body) = app.send(get("/api/sessions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 2);
    let mut kinds: Vec<&str> = history.iter().map(|h| h["type"].as_str().unwrap()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, ["reading", "speaking"]);

    let (_, body) = app.send(get("/api/sessions?type=reading", Some(&token))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["materialTitle"], "Bài 1");

    let (status, _) = app.send(get("/api/sessions?type=writing", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(post_json("/api/sessions", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().unwrap().starts_with("temp_"));

    let (status, body) = app
        .send(put_json("/api/sessions/temp_1/end", Some(&token), json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session ended");
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[tokio::test]
async fn metrics_for_a_new_user_are_zero() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, body) = app.send(get("/api/dashboard/metrics", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalReadingMinutes": 0,
            "totalSpeakingMinutes": 0,
            "completedSessions": 0,
            "wordsLearned": 0,
            "streakDays": 0
        })
    );
}

#[tokio::test]
async fn metrics_count_sessions_words_and_streak() {
    let app = TestApp::new();
    let (token, id) = app.register_user("lan").await;

    // Noon UTC keeps the calendar day stable across local time zones.
    let today_noon = Utc.from_utc_datetime(&Utc::now().date_naive().and_hms_opt(12, 0, 0).unwrap());
    app.db.insert_progress_at(id, MaterialKind::Reading, today_noon);
    app.db.insert_progress_at(id, MaterialKind::Reading, today_noon - Duration::days(1));
    app.db.insert_progress_at(id, MaterialKind::Speaking, today_noon - Duration::days(1));
    app.send(post_json("/api/library", Some(&token), json!({ "text": "mèo" })))
        .await;

    let (_, body) = app.send(get("/api/dashboard/metrics", Some(&token))).await;
    assert_eq!(body["totalReadingMinutes"], 10);
    assert_eq!(body["totalSpeakingMinutes"], 3);
    assert_eq!(body["completedSessions"], 3);
    assert_eq!(body["wordsLearned"], 1);
    assert!(body["streakDays"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn metrics_fail_whole_when_an_input_fails() {
    let app = TestApp::new();
    let token = app.register("lan").await;
    *app.db.fail_word_count.lock().unwrap() = true;

    let (status, body) = app.send(get("/api/dashboard/metrics", Some(&token))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch metrics");
    assert!(body.get("streakDays").is_none());
}

#[tokio::test]
async fn recent_reading_placeholders_and_preview() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, body) = app.send(get("/api/dashboard/recent-reading", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Chào mừng!");
    assert!(body["materialId"].is_null());

    let long_text = "chữ ".repeat(100);
    let material = app.db.insert_material(MaterialKind::Reading, "Bài dài", &long_text);
    app.send(post_json(
        "/api/readings/progress",
        Some(&token),
        json!({ "materialId": material, "percent": 40 }),
    ))
    .await;

    let (_, body) = app.send(get("/api/dashboard/recent-reading", Some(&token))).await;
    assert_eq!(body["title"], "Bài dài");
    let preview = body["preview"].as_str().unwrap();
    assert_eq!(preview.chars().count(), 153);
    assert!(preview.ends_with("..."));

    app.send(delete(&format!("/api/readings/{}", material), Some(&token)))
        .await;
    let (_, body) = app.send(get("/api/dashboard/recent-reading", Some(&token))).await;
    assert_eq!(body["title"], "Bài đọc không tồn tại");
    assert!(body["lastReadAt"].is_string());
}

#[tokio::test]
async fn new_words_default_to_three() {
    let app = TestApp::new();
    let token = app.register("lan").await;
    for word in ["một", "hai", "ba", "bốn"] {
        app.send(post_json("/api/library", Some(&token), json!({ "text": word })))
            .await;
    }

    let (_, body) = app.send(get("/api/dashboard/new-words", Some(&token))).await;
    let words = body.as_array().unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(words[0]["definition"], "");

    let (_, body) = app.send(get("/api/dashboard/new-words?limit=1", Some(&token))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_query_value_uses_the_error_shape() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, body) = app
        .send(get("/api/dashboard/new-words?limit=abc", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn assessment_falls_back_to_rules_without_a_model() {
    let app = TestApp::new();
    let token = app.register("lan").await;

    let (status, body) = app
        .send(post_json(
            "/api/ai/assess-level",
            Some(&token),
            json!({ "content": "Con mèo ăn cá." }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "A1");
    assert_eq!(body["recommendedTopic"], "Động vật");

    let (status, _) = app
        .send(post_json("/api/ai/assess-level", Some(&token), json!({ "content": " " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
