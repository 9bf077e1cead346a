mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;

use common::{bearer, location, test_app};
use huddle_api::models::channel::ChannelType;
use huddle_api::models::member::MemberRole;

#[tokio::test]
async fn signed_out_viewer_is_sent_home() {
    let app = test_app();

    let resp = app.server.get("/api/servers/srv_anything/sidebar").await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn unknown_server_is_sent_home() {
    let app = test_app();
    let (token, _) = app.sign_in("idp|alice", "alice").await;

    let resp = app
        .server
        .get("/api/servers/srv_missing/sidebar")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn sidebar_groups_channels_and_excludes_viewer() {
    let app = test_app();
    let (token, owner) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();

    app.store
        .insert_channel(server_id, &owner.id, "lounge", ChannelType::Audio.as_i16());
    app.store
        .insert_channel(server_id, &owner.id, "stage", ChannelType::Video.as_i16());
    app.store.insert_channel(server_id, &owner.id, "mystery", 9);

    let (_, moderator) = app.sign_in("idp|mod", "mod").await;
    app.store
        .insert_member(server_id, &moderator.id, MemberRole::Moderator);
    let (_, guest) = app.sign_in("idp|guest", "guest").await;
    app.store.insert_member(server_id, &guest.id, MemberRole::Guest);

    let resp = app
        .server
        .get(&format!("/api/servers/{server_id}/sidebar"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status_ok();
    let view: serde_json::Value = resp.json();

    assert_eq!(view["server"]["id"], server_id);
    assert_eq!(view["role"], "ADMIN");
    assert_eq!(view["is_admin"], true);
    assert_eq!(view["is_moderator"], true);

    let names = |key: &str| -> Vec<String> {
        view[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(names("text_channels"), ["general"]);
    assert_eq!(names("audio_channels"), ["lounge"]);
    assert_eq!(names("video_channels"), ["stage"]);

    let members = view["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .all(|m| m["profile_id"] != owner.id.as_str()));
    assert_eq!(members[0]["profile"]["id"], moderator.id.as_str());
    assert_eq!(members[1]["profile"]["id"], guest.id.as_str());

    let search = view["search"].as_array().unwrap();
    let labels: Vec<&str> = search
        .iter()
        .map(|g| g["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["Text Channels", "Voice Channels", "Video Channels", "Members"]
    );
    assert_eq!(search[0]["type"], "channel");
    assert_eq!(search[0]["data"][0]["icon"], "hash");
    assert_eq!(search[1]["data"][0]["icon"], "mic");
    assert_eq!(search[2]["data"][0]["icon"], "video");
    assert_eq!(search[3]["type"], "member");
    assert_eq!(search[3]["data"][0]["icon"], "shield-check");
    assert!(search[3]["data"][1]["icon"].is_null());
}

#[tokio::test]
async fn guest_viewer_sees_guest_role() {
    let app = test_app();
    let (owner_token, owner) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let code = server["invite_code"].as_str().unwrap();

    let (token, _) = app.sign_in("idp|guest", "guest").await;
    app.server
        .get(&format!("/invite/{code}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    let resp = app
        .server
        .get(&format!("/api/servers/{server_id}/sidebar"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status_ok();
    let view: serde_json::Value = resp.json();
    assert_eq!(view["role"], "GUEST");
    assert_eq!(view["is_admin"], false);
    assert_eq!(view["is_moderator"], false);
    let members = view["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["profile"]["id"], owner.id.as_str());
    assert_eq!(view["search"][3]["data"][0]["icon"], "shield-alert");
}

#[tokio::test]
async fn non_member_viewer_has_no_role() {
    let app = test_app();
    let (owner_token, _) = app.sign_in("idp|owner", "owner").await;
    let server = app.create_server(&owner_token, "Guild").await;
    let server_id = server["id"].as_str().unwrap();
    let (token, _) = app.sign_in("idp|stranger", "stranger").await;

    let resp = app
        .server
        .get(&format!("/api/servers/{server_id}/sidebar"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    resp.assert_status_ok();
    let view: serde_json::Value = resp.json();
    assert!(view["role"].is_null());
    assert_eq!(view["is_admin"], false);
    assert_eq!(view["members"].as_array().unwrap().len(), 1);
}
