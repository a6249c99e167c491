// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use avis_api::Api;
use avis_app::{ClientId, Polarity, SentimentId};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

#[test]
fn request_error_names_unreachable_service() {
    let api =
        Api::new("http://127.0.0.1:1", Duration::from_millis(50)).expect("api should initialize");

    let error = api
        .list_clients()
        .expect_err("list should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("http://127.0.0.1:1"));
    assert!(message.contains("data service is running"));
}

#[test]
fn rejects_unparseable_base_url() {
    let error =
        Api::new("not a url", Duration::from_secs(1)).expect_err("construction should fail");
    assert!(error.to_string().contains("service.base_url"));
}

#[test]
fn list_clients_decodes_rows() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Get);
        assert_eq!(request.url(), "/client");
        let response = Response::from_string(
            r#"[{"id":1,"email":"alice@test.com"},{"id":2,"email":"bob@test.com"}]"#,
        )
        .with_status_code(200)
        .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let clients = api.list_clients()?;
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].id, ClientId::new(1));
    assert_eq!(clients[0].email, "alice@test.com");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn base_url_prefix_lands_in_request_path() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api/", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/client");
        let response = Response::from_string("[]")
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let clients = api.list_clients()?;
    assert!(clients.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn create_client_posts_email_body() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/client");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        let payload: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(payload, serde_json::json!({"email": "carol@test.com"}));

        let response = Response::from_string(r#"{"id":3,"email":"carol@test.com"}"#)
            .with_status_code(201)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let created = api.create_client("carol@test.com")?;
    assert_eq!(created.id, ClientId::new(3));
    assert_eq!(created.email, "carol@test.com");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_client_puts_to_record_path() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.url(), "/client/7");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        let payload: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(payload, serde_json::json!({"email": "carol@corp.com"}));

        let response = Response::from_string(r#"{"id":7,"email":"carol@corp.com"}"#)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let updated = api.update_client(ClientId::new(7), "carol@corp.com")?;
    assert_eq!(updated.email, "carol@corp.com");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_client_accepts_empty_response() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Delete);
        assert_eq!(request.url(), "/client/7");
        request
            .respond(Response::empty(204))
            .expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    api.delete_client(ClientId::new(7))?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_sentiments_maps_nested_client_reference() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Get);
        assert_eq!(request.url(), "/sentiment");
        let body = concat!(
            r#"[{"id":1,"text":"t1","type":"positive","client":{"id":2}},"#,
            r#"{"id":2,"text":"t2","type":"negative","client":null}]"#,
        );
        let response = Response::from_string(body)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let sentiments = api.list_sentiments()?;
    assert_eq!(sentiments.len(), 2);
    assert_eq!(sentiments[0].polarity, Polarity::Positive);
    assert_eq!(sentiments[0].client_id, Some(ClientId::new(2)));
    assert_eq!(sentiments[1].polarity, Polarity::Negative);
    assert_eq!(sentiments[1].client_id, None);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn create_sentiment_sends_nested_client_reference() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/sentiment");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        let payload: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(
            payload,
            serde_json::json!({
                "text": "support never answered",
                "type": "negative",
                "client": {"id": 3},
            }),
        );

        let response = Response::from_string(
            r#"{"id":9,"text":"support never answered","type":"negative","client":{"id":3}}"#,
        )
        .with_status_code(201)
        .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let created = api.create_sentiment(
        "support never answered",
        Polarity::Negative,
        ClientId::new(3),
    )?;
    assert_eq!(created.id, SentimentId::new(9));
    assert_eq!(created.polarity, Polarity::Negative);
    assert_eq!(created.client_id, Some(ClientId::new(3)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_sentiment_never_mentions_owner() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.url(), "/sentiment/9");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        let payload: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
        assert_eq!(
            payload,
            serde_json::json!({"text": "resolved after escalation", "type": "positive"}),
        );

        let response = Response::from_string(
            r#"{"id":9,"text":"resolved after escalation","type":"positive","client":{"id":3}}"#,
        )
        .with_status_code(200)
        .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let updated = api.update_sentiment(
        SentimentId::new(9),
        "resolved after escalation",
        Polarity::Positive,
    )?;
    assert_eq!(updated.polarity, Polarity::Positive);
    assert_eq!(updated.client_id, Some(ClientId::new(3)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_error_message_is_surfaced() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"message":"email must be unique"}"#)
            .with_status_code(500)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let error = api
        .create_client("alice@test.com")
        .expect_err("create should surface the failure");
    let message = error.to_string();
    assert!(message.contains("server error (500)"));
    assert!(message.contains("email must be unique"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn error_envelope_body_is_surfaced() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"error":"sentiment text must not be blank"}"#)
            .with_status_code(422)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let error = api
        .create_sentiment("", Polarity::Positive, ClientId::new(1))
        .expect_err("create should surface the failure");
    let message = error.to_string();
    assert!(message.contains("server error (422)"));
    assert!(message.contains("sentiment text must not be blank"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn plain_text_error_body_is_surfaced() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string("service unavailable").with_status_code(503);
        request.respond(response).expect("response should succeed");
    });

    let api = Api::new(&addr, Duration::from_secs(1))?;
    let error = api
        .delete_sentiment(SentimentId::new(4))
        .expect_err("delete should surface the failure");
    let message = error.to_string();
    assert!(message.contains("server error (503): service unavailable"));

    handle.join().expect("server thread should join");
    Ok(())
}
