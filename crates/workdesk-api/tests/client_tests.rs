// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use reqwest::Method;
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use workdesk_api::{Client, RequestOptions};
use workdesk_app::{
    EmployeeId, FilterSpec, LoadError, MutationError, Role, StatusInput, TaskId, TaskStatus,
};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

fn header_value(request: &tiny_http::Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str().to_owned())
}

#[test]
fn unreachable_backend_error_names_the_remedy() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .employees()
        .expect_err("fetch should fail for unreachable endpoint");
    let LoadError::Unreachable(message) = error else {
        panic!("expected an unreachable error");
    };
    assert!(message.contains("server.base_url"));
}

#[test]
fn requests_carry_bearer_and_json_headers_by_default() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/departments/api/departments");
        assert_eq!(
            header_value(&request, "Authorization").as_deref(),
            Some("Bearer secret")
        );
        assert_eq!(
            header_value(&request, "Content-Type").as_deref(),
            Some("application/json")
        );
        let response = Response::from_string(
            r#"[{"id":1,"name":"Assembly","description":null,"createdAt":"2024-01-02T03:04:05"}]"#,
        )
        .with_status_code(200)
        .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?.with_token("secret");
    let departments = client.departments()?;
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].name, "Assembly");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn per_call_headers_replace_defaults() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            header_value(&request, "Content-Type").as_deref(),
            Some("text/plain")
        );
        assert_eq!(
            header_value(&request, "Authorization").as_deref(),
            Some("Bearer other")
        );
        request
            .respond(Response::from_string("pong").with_status_code(200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?.with_token("secret");
    let response = client.request(
        Method::GET,
        "/ping",
        RequestOptions::new()
            .header("content-type", "text/plain")
            .header("Authorization", "Bearer other"),
    )?;
    assert!(response.ok());
    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "pong");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn task_filters_become_query_parameters() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/tasks/api/list?taskType=MAINTENANCE&search=pump+seal"
        );
        request
            .respond(
                Response::from_string("[]")
                    .with_status_code(200)
                    .with_header(json_header()),
            )
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let filter = FilterSpec::new()
        .with("type", "MAINTENANCE")
        .with("status", " ")
        .with("search", "pump seal");
    assert!(client.tasks(&filter)?.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn plain_text_rejections_become_mutation_errors() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(*request.method(), tiny_http::Method::Patch);
        assert_eq!(
            request.url(),
            "/tasks/api/user/tasks/9/status?employeeId=0003"
        );
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("read request body");
        assert_eq!(body, r#"{"status":"COMPLETED"}"#);
        request
            .respond(Response::from_string("Task is not assigned to you").with_status_code(403))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?.with_token("secret");
    let error = client
        .update_task_status(
            TaskId::new(9),
            &EmployeeId::new("0003"),
            &StatusInput {
                status: TaskStatus::Completed,
            },
        )
        .expect_err("403 should be rejected");
    assert_eq!(
        error,
        MutationError::Rejected {
            status: 403,
            message: "Task is not assigned to you".to_owned(),
        }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_success_loads_report_status_and_message() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(
                Response::from_string(r#"{"error":"Token expired"}"#)
                    .with_status_code(401)
                    .with_header(json_header()),
            )
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client.task_stats().expect_err("401 should fail");
    assert_eq!(
        error,
        LoadError::Status {
            status: 401,
            message: "Token expired".to_owned(),
        }
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn login_returns_session_and_next_machine_id_accepts_bare_text() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut login = server.recv().expect("login request expected");
        assert_eq!(login.url(), "/api/login");
        let mut body = String::new();
        login
            .as_reader()
            .read_to_string(&mut body)
            .expect("read login body");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("login body is json");
        assert_eq!(parsed["employeeNumber"], 12);
        login
            .respond(
                Response::from_string(
                    r#"{"token":"jwt","role":"ADMIN","employeeNumber":12,"name":"Quinn Reed"}"#,
                )
                .with_status_code(200)
                .with_header(json_header()),
            )
            .expect("response should succeed");

        let next = server.recv().expect("next-id request expected");
        assert_eq!(next.url(), "/departments/api/machines/next-id");
        next.respond(Response::from_string("M-014").with_status_code(200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let session = client.login(12, "hunter2")?;
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.employee_id(), Some(EmployeeId::new("0012")));

    let client = client.with_token(&session.token);
    assert_eq!(client.next_machine_id()?.as_str(), "M-014");

    handle.join().expect("server thread should join");
    Ok(())
}
