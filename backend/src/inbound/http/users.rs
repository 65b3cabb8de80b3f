//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users       {"name":"Ada","surname":"Lovelace","password":"pw"}
//! GET    /api/v1/users?skip=0&limit=100
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}  {"surname":"King"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Mutating handlers announce a lifecycle event once the service call has
//! returned, i.e. after the database write committed. Publishing runs on a
//! spawned task and never influences the response.

use actix_web::{HttpResponse, delete, get, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::event_notifier::spawn_notify;
use crate::domain::{NewUser, Page, Password, TraceId, User, UserChanges, UserEvent, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/users`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = "Lovelace")]
    pub surname: String,
    #[schema(example = "analytical-engine")]
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            name: value.name,
            surname: value.surname,
            password: Password::new(value.password),
        }
    }
}

/// Request body for `PUT /api/v1/users/{id}`; absent fields stay unchanged.
#[derive(Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            name: value.name,
            surname: value.surname,
            password: value.password.map(Password::new),
        }
    }
}

/// Paging parameters for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Number of users to skip.
    #[param(minimum = 0, default = 0)]
    pub skip: Option<u32>,
    /// Maximum number of users to return.
    #[param(minimum = 0, default = 100)]
    pub limit: Option<u32>,
}

/// User representation returned by the API. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = "Lovelace")]
    pub surname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            name: user.name,
            surname: user.surname,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn announce(state: &HttpState, event: UserEvent, trace_id: TraceId) {
    spawn_notify(state.events.clone(), event, Some(trace_id));
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.create_user(payload.into_inner().into()).await?;
    announce(&state, UserEvent::created(&user), trace_id);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// List users ordered by identifier.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use user_service::inbound::http::users::list_users;
///
/// let app = App::new().route("/users", web::get().to(list_users));
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let ListUsersQuery { skip, limit } = query.into_inner();
    let users = state.users.list_users(Page::new(skip, limit)).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch a single user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_user(UserId::new(path.into_inner())).await?;
    Ok(web::Json(user.into()))
}

/// Apply a partial update.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = UserId::new(path.into_inner());
    let user = state
        .users
        .update_user(id, payload.into_inner().into())
        .await?;
    announce(&state, UserEvent::updated(&user), trace_id);
    Ok(web::Json(user.into()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner());
    state.users.delete_user(id).await?;
    announce(&state, UserEvent::deleted(id), trace_id);
    Ok(HttpResponse::NoContent().finish())
}

/// Collection routes answer with and without a trailing slash.
const COLLECTION_PATHS: [&str; 2] = ["/users", "/users/"];

/// Register the users resource on a scope such as `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(COLLECTION_PATHS)
            .route(web::post().to(create_user))
            .route(web::get().to(list_users)),
    )
    .service(get_user)
    .service(update_user)
    .service(delete_user);
}
