// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod endpoints;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use workdesk_app::{
    AssignedTask, Department, DepartmentId, DepartmentInput, Employee, EmployeeId, EmployeeInput,
    EmployeeStats, FilterSpec, LoadError, Machine, MachineId, MachineInput, MutationError,
    PersonalTaskInput, RecentAssignment, ReportInput, Session, StatusInput, Task, TaskDetails,
    TaskId, TaskInput, TaskOverview, TaskStats, UpcomingTask,
};

/// Per-call additions to a request. Headers here replace the defaults of the
/// same name.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).context("encode request body")?);
        Ok(self)
    }
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    fn error_message(&self) -> String {
        clean_error_response(self.status, &self.body)
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let parsed = Url::parse(trimmed)
            .with_context(|| format!("server.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: trimmed.to_owned(),
            token: None,
            timeout,
            http,
        })
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.set_token(token);
        self
    }

    pub fn set_token(&mut self, token: &str) {
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_owned());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request with the bearer token and a JSON content type
    /// unless `options` overrides them. Only transport failures are errors;
    /// non-2xx statuses come back as a response.
    pub fn request(&self, method: Method, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .with_context(|| format!("build URL for {path}"))?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("auth token contains characters not allowed in a header")?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name {name:?}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {name}"))?;
            headers.insert(name, value);
        }

        debug!(%method, %url, "sending request");
        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }
        let response = builder
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let status = response.status();
        let body = response.text().context("read response body")?;
        Ok(ApiResponse { status, body })
    }

    pub fn login(&self, employee_number: i64, password: &str) -> Result<Session> {
        let options = RequestOptions::new().json(&LoginRequest {
            employee_number,
            password,
        })?;
        let response = self.request(Method::POST, endpoints::LOGIN, options)?;
        if !response.ok() {
            bail!(
                "login failed: {} -- check auth.employee_number and WORKDESK_PASSWORD",
                response.error_message()
            );
        }
        response.json().context("decode login response")
    }

    /// Confirms the backend is reachable and the credentials are accepted.
    pub fn ping(&self, session: &Session) -> Result<()> {
        let path = match (session.role, session.employee_id()) {
            (workdesk_app::Role::Admin, _) => endpoints::TASK_STATS.to_owned(),
            (_, Some(employee)) => endpoints::user_task_stats(&employee),
            (_, None) => return Err(anyhow!("session has no employee number")),
        };
        let response = self.request(Method::GET, &path, RequestOptions::new())?;
        if !response.ok() {
            bail!("{}", response.error_message());
        }
        Ok(())
    }

    pub fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<T, LoadError> {
        let options = RequestOptions {
            query: query.to_vec(),
            ..RequestOptions::default()
        };
        let response = self
            .request(Method::GET, path, options)
            .map_err(|error| LoadError::Unreachable(format!("{error:#}")))?;
        if !response.ok() {
            let message = response.error_message();
            warn!(path, status = response.status(), %message, "load rejected");
            return Err(LoadError::Status {
                status: response.status(),
                message,
            });
        }
        response
            .json()
            .map_err(|error| LoadError::Decode(format!("{path}: {error}")))
    }

    pub fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> std::result::Result<ApiResponse, MutationError> {
        let options = RequestOptions {
            query: query.to_vec(),
            body,
            ..RequestOptions::default()
        };
        debug!(%method, path, "sending mutation");
        let response = self
            .request(method, path, options)
            .map_err(|error| MutationError::Unreachable(format!("{error:#}")))?;
        if !response.ok() {
            let message = response.error_message();
            warn!(path, status = response.status(), %message, "mutation rejected");
            return Err(MutationError::Rejected {
                status: response.status(),
                message,
            });
        }
        Ok(response)
    }

    pub fn employees(&self) -> std::result::Result<Vec<Employee>, LoadError> {
        self.fetch(endpoints::EMPLOYEES, &[])
    }

    pub fn employee_stats(&self) -> std::result::Result<EmployeeStats, LoadError> {
        self.fetch(endpoints::EMPLOYEE_STATS, &[])
    }

    pub fn next_employee_number(&self) -> std::result::Result<i64, LoadError> {
        self.fetch(endpoints::EMPLOYEE_NEXT_NUMBER, &[])
    }

    /// Tasks, narrowed on the server by the filter keys it understands.
    pub fn tasks(&self, filter: &FilterSpec) -> std::result::Result<Vec<Task>, LoadError> {
        self.fetch(endpoints::TASKS, &task_query(filter))
    }

    pub fn task_stats(&self) -> std::result::Result<TaskStats, LoadError> {
        self.fetch(endpoints::TASK_STATS, &[])
    }

    pub fn user_tasks(&self, employee: &EmployeeId) -> std::result::Result<Vec<AssignedTask>, LoadError> {
        self.fetch(&endpoints::user_tasks(employee), &[])
    }

    pub fn user_task_stats(&self, employee: &EmployeeId) -> std::result::Result<TaskStats, LoadError> {
        self.fetch(&endpoints::user_task_stats(employee), &[])
    }

    /// Assignments for `employee` matching the overview filters. The server
    /// also orders them overdue first, then by due date.
    pub fn user_overview(
        &self,
        employee: &EmployeeId,
        filter: &FilterSpec,
    ) -> std::result::Result<Vec<AssignedTask>, LoadError> {
        self.fetch(
            &endpoints::user_overview(employee),
            &query_for(&endpoints::USER_OVERVIEW_QUERY, filter),
        )
    }

    pub fn upcoming_tasks(&self, employee: &EmployeeId) -> std::result::Result<Vec<UpcomingTask>, LoadError> {
        self.fetch(&endpoints::user_upcoming_tasks(employee), &[])
    }

    pub fn recent_assignments(
        &self,
        employee: &EmployeeId,
    ) -> std::result::Result<Vec<RecentAssignment>, LoadError> {
        self.fetch(&endpoints::user_recent_assignments(employee), &[])
    }

    pub fn task_overview(&self, filter: &FilterSpec) -> std::result::Result<TaskOverview, LoadError> {
        self.fetch(
            endpoints::ADMIN_OVERVIEW,
            &query_for(&endpoints::ADMIN_OVERVIEW_QUERY, filter),
        )
    }

    pub fn task_details(&self, id: TaskId) -> std::result::Result<TaskDetails, LoadError> {
        self.fetch(&endpoints::admin_task_details(id), &[])
    }

    pub fn departments(&self) -> std::result::Result<Vec<Department>, LoadError> {
        self.fetch(endpoints::DEPARTMENTS, &[])
    }

    pub fn machines(&self) -> std::result::Result<Vec<Machine>, LoadError> {
        self.fetch(endpoints::MACHINES, &[])
    }

    /// The backend answers with either a JSON string or bare text.
    pub fn next_machine_id(&self) -> std::result::Result<MachineId, LoadError> {
        let response = self
            .request(Method::GET, endpoints::MACHINE_NEXT_ID, RequestOptions::new())
            .map_err(|error| LoadError::Unreachable(format!("{error:#}")))?;
        if !response.ok() {
            return Err(LoadError::Status {
                status: response.status(),
                message: response.error_message(),
            });
        }
        let id = response
            .json::<String>()
            .unwrap_or_else(|_| response.text().trim().to_owned());
        if id.is_empty() {
            return Err(LoadError::Decode("empty machine id".to_owned()));
        }
        Ok(MachineId::new(id))
    }

    pub fn create_employee(&self, input: &EmployeeInput) -> std::result::Result<(), MutationError> {
        self.send(Method::POST, endpoints::EMPLOYEE_CREATE, &[], Some(body(input)?))
            .map(drop)
    }

    pub fn update_employee(
        &self,
        id: &EmployeeId,
        input: &EmployeeInput,
    ) -> std::result::Result<(), MutationError> {
        self.send(Method::PUT, &endpoints::employee_update(id), &[], Some(body(input)?))
            .map(drop)
    }

    pub fn delete_employee(&self, id: &EmployeeId) -> std::result::Result<(), MutationError> {
        self.send(Method::DELETE, &endpoints::employee_delete(id), &[], None)
            .map(drop)
    }

    pub fn create_task(&self, input: &TaskInput) -> std::result::Result<(), MutationError> {
        self.send(Method::POST, endpoints::TASK_CREATE, &[], Some(body(input)?))
            .map(drop)
    }

    pub fn update_task(&self, id: TaskId, input: &TaskInput) -> std::result::Result<(), MutationError> {
        self.send(Method::PUT, &endpoints::task_update(id), &[], Some(body(input)?))
            .map(drop)
    }

    pub fn delete_task(&self, id: TaskId) -> std::result::Result<(), MutationError> {
        self.send(Method::DELETE, &endpoints::task_delete(id), &[], None)
            .map(drop)
    }

    /// Creates a task assigned to the signed-in user.
    pub fn create_personal_task(&self, input: &PersonalTaskInput) -> std::result::Result<(), MutationError> {
        self.send(Method::POST, endpoints::USER_TASK_CREATE, &[], Some(body(input)?))
            .map(drop)
    }

    /// The backend answers 403 unless the caller created the task.
    pub fn delete_personal_task(&self, id: TaskId) -> std::result::Result<(), MutationError> {
        self.send(Method::DELETE, &endpoints::user_task_delete(id), &[], None)
            .map(drop)
    }

    pub fn create_department(&self, input: &DepartmentInput) -> std::result::Result<(), MutationError> {
        self.send(Method::POST, endpoints::DEPARTMENT_CREATE, &[], Some(body(input)?))
            .map(drop)
    }

    pub fn update_department(
        &self,
        id: DepartmentId,
        input: &DepartmentInput,
    ) -> std::result::Result<(), MutationError> {
        self.send(Method::PUT, &endpoints::department_update(id), &[], Some(body(input)?))
            .map(drop)
    }

    pub fn delete_department(&self, id: DepartmentId) -> std::result::Result<(), MutationError> {
        self.send(Method::DELETE, &endpoints::department_delete(id), &[], None)
            .map(drop)
    }

    pub fn create_machine(&self, input: &MachineInput) -> std::result::Result<(), MutationError> {
        self.send(Method::POST, endpoints::MACHINE_CREATE, &[], Some(body(input)?))
            .map(drop)
    }

    pub fn update_machine(
        &self,
        id: &MachineId,
        input: &MachineInput,
    ) -> std::result::Result<(), MutationError> {
        self.send(Method::PUT, &endpoints::machine_update(id), &[], Some(body(input)?))
            .map(drop)
    }

    pub fn delete_machine(&self, id: &MachineId) -> std::result::Result<(), MutationError> {
        self.send(Method::DELETE, &endpoints::machine_delete(id), &[], None)
            .map(drop)
    }

    pub fn update_task_status(
        &self,
        task: TaskId,
        employee: &EmployeeId,
        input: &StatusInput,
    ) -> std::result::Result<(), MutationError> {
        self.send(
            Method::PATCH,
            &endpoints::user_task_status(task),
            &employee_query(employee),
            Some(body(input)?),
        )
        .map(drop)
    }

    pub fn submit_task_report(
        &self,
        task: TaskId,
        employee: &EmployeeId,
        input: &ReportInput,
    ) -> std::result::Result<(), MutationError> {
        self.send(
            Method::POST,
            &endpoints::user_task_report(task),
            &employee_query(employee),
            Some(body(input)?),
        )
        .map(drop)
    }
}

fn body(input: &impl Serialize) -> std::result::Result<serde_json::Value, MutationError> {
    serde_json::to_value(input).map_err(|error| MutationError::Rejected {
        status: 0,
        message: format!("encode request body: {error}"),
    })
}

/// Query pairs for the task list; blank filter values are left out.
pub fn task_query(filter: &FilterSpec) -> Vec<(String, String)> {
    query_for(&endpoints::TASK_QUERY, filter)
}

/// Maps filter keys to query names; keys without a mapping stay local.
pub fn query_for(names: &[(&str, &str)], filter: &FilterSpec) -> Vec<(String, String)> {
    names
        .iter()
        .filter_map(|(key, name)| {
            filter
                .get(key)
                .map(|value| ((*name).to_owned(), value.to_owned()))
        })
        .collect()
}

fn employee_query(employee: &EmployeeId) -> Vec<(String, String)> {
    vec![("employeeId".to_owned(), employee.as_str().to_owned())]
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    employee_number: i64,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "{} ({}) -- check that the backend is running and server.base_url is correct",
        base_url,
        error
    )
}

/// Reduces an error body to something worth showing in a notice.
pub fn clean_error_response(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed
            .error
            .into_iter()
            .chain(parsed.message)
            .find(|message| !message.trim().is_empty())
    {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.contains('{') && !trimmed.contains('<') {
        return trimmed.to_owned();
    }

    format!("server returned {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response, endpoints, query_for, task_query};
    use reqwest::StatusCode;
    use std::time::Duration;
    use workdesk_app::FilterSpec;

    #[test]
    fn error_bodies_are_unwrapped_or_collapsed() {
        assert_eq!(
            clean_error_response(StatusCode::BAD_REQUEST, r#"{"error":"Email already exists"}"#),
            "Email already exists"
        );
        assert_eq!(
            clean_error_response(StatusCode::BAD_REQUEST, r#"{"message":"Department in use"}"#),
            "Department in use"
        );
        assert_eq!(
            clean_error_response(StatusCode::NOT_FOUND, "Employee not found"),
            "Employee not found"
        );
        assert_eq!(
            clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, "<html><body>oops</body></html>"),
            "server returned 500"
        );
        assert_eq!(
            clean_error_response(StatusCode::BAD_GATEWAY, ""),
            "server returned 502"
        );
    }

    #[test]
    fn task_query_skips_blank_and_unknown_keys() {
        let filter = FilterSpec::new()
            .with("type", "MEETING")
            .with("status", "")
            .with("department", "4")
            .with("overdue", "hide");
        assert_eq!(
            task_query(&filter),
            vec![
                ("taskType".to_owned(), "MEETING".to_owned()),
                ("departmentId".to_owned(), "4".to_owned()),
            ]
        );
    }

    #[test]
    fn report_filters_use_each_endpoint_vocabulary() {
        let filter = FilterSpec::new()
            .with("creator", "admin")
            .with("from", "2025-05-01")
            .with("overdue", "only");
        assert_eq!(
            query_for(&endpoints::ADMIN_OVERVIEW_QUERY, &filter),
            vec![
                ("creatorType".to_owned(), "admin".to_owned()),
                ("startDate".to_owned(), "2025-05-01".to_owned()),
            ]
        );
        let mine = FilterSpec::new().with("creator", "USER").with("to", "2025-06-30");
        assert_eq!(
            query_for(&endpoints::USER_OVERVIEW_QUERY, &mine),
            vec![
                ("creatorRole".to_owned(), "USER".to_owned()),
                ("endDate".to_owned(), "2025-06-30".to_owned()),
            ]
        );
    }

    #[test]
    fn client_rejects_non_http_base_urls() {
        assert!(Client::new("ftp://example.com", Duration::from_secs(1)).is_err());
        assert!(Client::new("  ", Duration::from_secs(1)).is_err());
        let client = Client::new("http://localhost:8080/", Duration::from_secs(1))
            .expect("valid base url");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert!(!client.has_token());
        assert!(client.with_token(" abc ").has_token());
    }
}
