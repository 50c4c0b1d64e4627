use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EmployeeId, EmployeeLevel, HireRequest, SalaryRange};
use super::roster::{ResponseMessage, Roster};
use super::rules::ValidationError;
use super::service::{CompanyService, CompanyServiceError};

type SharedService<R> = State<Arc<CompanyService<R>>>;

/// Router builder exposing the workforce operations over HTTP.
///
/// Every failure, including bodies or query strings that do not decode, is answered with a
/// `{ "error": … }` payload: 400 for rejected input, 500 for storage faults.
pub fn company_router<R>(service: Arc<CompanyService<R>>) -> Router
where
    R: Roster + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            get(list_employees_handler::<R>).post(hire_handler::<R>),
        )
        .route(
            "/api/v1/employees/salary",
            get(salary_range_handler::<R>),
        )
        .route("/api/v1/employees/raise", post(raise_handler::<R>))
        .route(
            "/api/v1/employees/promotion",
            post(promotion_handler::<R>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            delete(fire_handler::<R>),
        )
        .route(
            "/api/v1/employees/:employee_id/team",
            delete(leave_team_handler::<R>),
        )
        .route(
            "/api/v1/teams",
            get(list_teams_handler::<R>).post(create_team_handler::<R>),
        )
        .route(
            "/api/v1/teams/:team_name",
            get(team_info_handler::<R>).delete(remove_team_handler::<R>),
        )
        .route(
            "/api/v1/teams/:team_name/members",
            post(add_member_handler::<R>),
        )
        .route("/api/v1/salaries", get(salaries_handler::<R>))
        .route("/api/v1/salaries/total", get(total_salaries_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LevelQuery {
    #[serde(default)]
    pub(crate) level: Option<EmployeeLevel>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SalaryQuery {
    #[serde(default)]
    pub(crate) salary_from: Option<f64>,
    #[serde(default)]
    pub(crate) salary_to: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RaiseRequest {
    #[serde(default)]
    pub(crate) employee_id: Option<EmployeeId>,
    pub(crate) percent: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmployeeRef {
    #[serde(default)]
    pub(crate) employee_id: Option<EmployeeId>,
}

impl EmployeeRef {
    fn require(&self) -> Result<EmployeeId, ValidationError> {
        self.employee_id.ok_or(ValidationError::MissingEmployeeId)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateTeamRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

pub(crate) async fn list_employees_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    query: Result<Query<LevelQuery>, QueryRejection>,
) -> Response {
    let result = decoded(query).and_then(|Query(query)| service.list_employees(query.level));
    match result {
        Ok(employees) => (StatusCode::OK, Json(ResponseMessage::ok(employees))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn salary_range_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    query: Result<Query<SalaryQuery>, QueryRejection>,
) -> Response {
    let result = decoded(query).and_then(|Query(query)| {
        service.list_employees_by_salary(SalaryRange::new(query.salary_from, query.salary_to))
    });
    match result {
        Ok(employees) => (StatusCode::OK, Json(ResponseMessage::ok(employees))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn hire_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    payload: Result<Json<HireRequest>, JsonRejection>,
) -> Response {
    match decoded(payload).and_then(|Json(request)| service.hire(request)) {
        Ok(employee) => (StatusCode::CREATED, Json(employee)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn fire_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    employee_id: Result<Path<u64>, PathRejection>,
) -> Response {
    match decoded(employee_id).and_then(|Path(id)| service.fire(EmployeeId(id))) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn raise_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    payload: Result<Json<RaiseRequest>, JsonRejection>,
) -> Response {
    let result = decoded(payload).and_then(|Json(request)| {
        let id = request
            .employee_id
            .ok_or(ValidationError::MissingEmployeeId)?;
        service.give_raise(id, request.percent)
    });

    match result {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn promotion_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    payload: Result<Json<EmployeeRef>, JsonRejection>,
) -> Response {
    let result = decoded(payload)
        .and_then(|Json(request)| Ok(request.require()?))
        .and_then(|id| service.give_promotion(id));

    match result {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn leave_team_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    employee_id: Result<Path<u64>, PathRejection>,
) -> Response {
    let result = decoded(employee_id)
        .and_then(|Path(id)| service.remove_employee_from_team(EmployeeId(id)));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_teams_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
) -> Response {
    match service.list_teams() {
        Ok(names) => (StatusCode::OK, Json(ResponseMessage::ok(names))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_team_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Response {
    let result = decoded(payload).and_then(|Json(request)| {
        service.create_team(request.name.as_deref().unwrap_or_default())
    });
    match result {
        Ok(team) => (StatusCode::CREATED, Json(team)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_team_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    Path(team_name): Path<String>,
) -> Response {
    match service.remove_team(&team_name) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn team_info_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    Path(team_name): Path<String>,
) -> Response {
    match service.team_info(&team_name) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn add_member_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    Path(team_name): Path<String>,
    payload: Result<Json<EmployeeRef>, JsonRejection>,
) -> Response {
    let result = decoded(payload)
        .and_then(|Json(request)| Ok(request.require()?))
        .and_then(|id| service.add_employee_to_team(id, &team_name));

    match result {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn salaries_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
    query: Result<Query<LevelQuery>, QueryRejection>,
) -> Response {
    let result = decoded(query).and_then(|Query(query)| {
        let level = query.level.ok_or(ValidationError::MissingLevel)?;
        Ok((level, service.salaries(level)?))
    });

    match result {
        Ok((level, total)) => {
            (StatusCode::OK, Json(json!({ "level": level, "total": total }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn total_salaries_handler<R: Roster + 'static>(
    State(service): SharedService<R>,
) -> Response {
    match service.summarize_salaries() {
        Ok(total) => (StatusCode::OK, Json(json!({ "total": total }))).into_response(),
        Err(err) => error_response(err),
    }
}

// Extractor rejections count as invalid input, same as a failed business rule.
fn decoded<T, E: Display>(extracted: Result<T, E>) -> Result<T, CompanyServiceError> {
    extracted.map_err(|rejection| ValidationError::MalformedRequest(rejection.to_string()).into())
}

fn error_response(err: CompanyServiceError) -> Response {
    let status = match err {
        CompanyServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        CompanyServiceError::Roster(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
