//! End-to-end tests for Taskboard.
//!
//! The tests run the client against [`FakeApi`], an in-process axum server
//! that speaks the Taskboard REST API from an in-memory dataset. Nothing
//! external is needed:
//!
//! ```bash
//! cargo test -p taskboard-integration-tests
//! ```
//!
//! # Seeded data
//!
//! | Users                         | Projects                 | Tasks                         |
//! |-------------------------------|--------------------------|-------------------------------|
//! | 1 `admin` (admin)             | 16 Migración (owner 1)   | 7 Inventario, p16, assignee 2 |
//! | 2 `ana` (usuario)             | 17 Portal (owner 1)      | 8 Revisión, p17, assignee 3   |
//! | 3 `luis` (usuario)            |                          |                               |
//!
//! Alerts 1, 2 and 4 belong to `ana` (4 already hidden); alert 3 belongs to
//! `admin`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use taskboard_client::{ApiClient, CorruptTokenPolicy, MemoryTokenStore, SessionStore, TokenStore};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Login credentials of a seeded account.
#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub id: i64,
    pub username: &'static str,
    pub password: &'static str,
}

pub const ADMIN: SeedUser = SeedUser {
    id: 1,
    username: "admin",
    password: "admin-pass",
};

pub const ANA: SeedUser = SeedUser {
    id: 2,
    username: "ana",
    password: "ana-pass",
};

pub const LUIS: SeedUser = SeedUser {
    id: 3,
    username: "luis",
    password: "luis-pass",
};

/// Project every seeded user can see.
pub const MIGRATION_PROJECT: i64 = 16;

const STATUSES: [&str; 3] = ["pendiente", "en_progreso", "completada"];

// =============================================================================
// Server handle
// =============================================================================

/// A running fake of the Taskboard API.
///
/// The server stops when the handle is dropped.
pub struct FakeApi {
    base_url: Url,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start a server on an ephemeral local port with the seeded dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> io::Result<Self> {
        let state = Arc::new(FakeState::seeded());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/")).map_err(io::Error::other)?;

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            state,
            server,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A client pointed at this server, keeping its token in `tokens`.
    #[must_use]
    pub fn client(&self, tokens: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::with_http(reqwest::Client::new(), self.base_url.clone(), tokens)
    }

    /// A session store backed by a fresh in-memory token store.
    #[must_use]
    pub fn session(&self) -> SessionStore {
        self.session_with(Arc::new(MemoryTokenStore::new()))
    }

    /// A session store backed by `tokens`.
    #[must_use]
    pub fn session_with(&self, tokens: Arc<dyn TokenStore>) -> SessionStore {
        SessionStore::new(self.client(tokens), CorruptTokenPolicy::Purge)
    }

    /// Delay every `GET` by `latency` before it is handled.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.state.latency) = latency;
    }

    /// Change an account's role on the server only. Tokens already issued
    /// keep the old role.
    pub fn set_role(&self, id: i64, role: &str) {
        let mut db = self.state.db();
        if let Some(user) = db.users.get_mut(&id) {
            user.rol = role.to_string();
        }
    }

    /// Answer every request with a 500 while `outage` is set.
    pub fn set_outage(&self, outage: bool) {
        self.state.outage.store(outage, Ordering::SeqCst);
    }

    /// Make login and registration hand out tokens that cannot be decoded.
    pub fn issue_malformed_tokens(&self, malformed: bool) {
        self.state.malformed.store(malformed, Ordering::SeqCst);
    }

    /// Requests received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state.requests).clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.state.requests).clear();
    }

    /// Server-side visibility of an alert.
    #[must_use]
    pub fn alert_visible(&self, id: i64) -> Option<bool> {
        self.state.db().alerts.get(&id).map(|a| a.visible)
    }

    /// Whether an account with this username exists.
    #[must_use]
    pub fn has_user(&self, username: &str) -> bool {
        self.state.db().users.values().any(|u| u.username == username)
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// State
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct FakeState {
    db: Mutex<Db>,
    latency: Mutex<Duration>,
    malformed: AtomicBool,
    outage: AtomicBool,
    serial: AtomicU64,
    requests: Mutex<Vec<String>>,
}

impl FakeState {
    fn seeded() -> Self {
        Self {
            db: Mutex::new(Db::seeded()),
            latency: Mutex::new(Duration::ZERO),
            malformed: AtomicBool::new(false),
            outage: AtomicBool::new(false),
            serial: AtomicU64::new(1),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn db(&self) -> MutexGuard<'_, Db> {
        lock(&self.db)
    }

    /// Issue an access/refresh pair for `user` and remember the access token.
    fn issue(&self, db: &mut Db, user: &UserRow) -> (String, String) {
        let serial = self.serial.fetch_add(1, Ordering::SeqCst);
        let token = if self.malformed.load(Ordering::SeqCst) {
            format!("not-a-token-{serial}")
        } else {
            mint(user, "access", serial)
        };
        let refresh = mint(user, "refresh", serial);
        db.sessions.insert(token.clone(), user.id);
        (token, refresh)
    }
}

#[derive(Debug, Clone, Serialize)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    nombre: String,
    rol: String,
    #[serde(skip)]
    password: String,
}

#[derive(Debug, Clone, Serialize)]
struct ProjectRow {
    id: i64,
    nombre: String,
    descripcion: String,
    fecha_inicio: String,
    fecha_finalizacion: String,
    usuario: i64,
}

#[derive(Debug, Clone, Serialize)]
struct TaskRow {
    id: i64,
    nombre: String,
    descripcion: String,
    estado: String,
    proyecto: i64,
    asignada_a: i64,
}

#[derive(Debug, Clone, Serialize)]
struct AlertRow {
    id: i64,
    usuario: i64,
    mensaje: String,
    #[serde(rename = "fechaCreacion")]
    fecha_creacion: String,
    visible: bool,
}

#[derive(Default)]
struct Db {
    users: BTreeMap<i64, UserRow>,
    projects: BTreeMap<i64, ProjectRow>,
    tasks: BTreeMap<i64, TaskRow>,
    alerts: BTreeMap<i64, AlertRow>,
    sessions: HashMap<String, i64>,
}

fn next_id<V>(rows: &BTreeMap<i64, V>) -> i64 {
    rows.keys().next_back().map_or(1, |id| id + 1)
}

impl Db {
    fn seeded() -> Self {
        let mut db = Self::default();

        for (seed, email, nombre, rol) in [
            (ADMIN, "admin@example.com", "Administración", "admin"),
            (ANA, "ana@example.com", "Ana Pérez", "usuario"),
            (LUIS, "", "", "usuario"),
        ] {
            db.users.insert(
                seed.id,
                UserRow {
                    id: seed.id,
                    username: seed.username.to_string(),
                    email: email.to_string(),
                    nombre: nombre.to_string(),
                    rol: rol.to_string(),
                    password: seed.password.to_string(),
                },
            );
        }

        for (id, nombre, start, end) in [
            (MIGRATION_PROJECT, "Migración", "2024-10-01", "2024-12-20"),
            (17, "Portal", "2024-11-01", "2025-03-31"),
        ] {
            db.projects.insert(
                id,
                ProjectRow {
                    id,
                    nombre: nombre.to_string(),
                    descripcion: String::new(),
                    fecha_inicio: start.to_string(),
                    fecha_finalizacion: end.to_string(),
                    usuario: ADMIN.id,
                },
            );
        }

        for (id, nombre, estado, proyecto, asignada_a) in [
            (7, "Inventario", "en_progreso", MIGRATION_PROJECT, ANA.id),
            (8, "Revisión", "pendiente", 17, LUIS.id),
        ] {
            db.tasks.insert(
                id,
                TaskRow {
                    id,
                    nombre: nombre.to_string(),
                    descripcion: String::new(),
                    estado: estado.to_string(),
                    proyecto,
                    asignada_a,
                },
            );
        }

        for (id, usuario, mensaje, visible) in [
            (1, ANA.id, "Nueva tarea asignada: Inventario", true),
            (2, ANA.id, "Proyecto Migración actualizado", true),
            (3, ADMIN.id, "Nuevo usuario registrado", true),
            (4, ANA.id, "Bienvenida", false),
        ] {
            db.alerts.insert(
                id,
                AlertRow {
                    id,
                    usuario,
                    mensaje: mensaje.to_string(),
                    fecha_creacion: "2024-10-02T09:30:00Z".to_string(),
                    visible,
                },
            );
        }

        db
    }
}

fn mint(user: &UserRow, kind: &str, serial: u64) -> String {
    let now = Utc::now().timestamp();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "token_type": kind,
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "rol": user.rol,
        "iat": now,
        "exp": now + 3600,
        "jti": serial,
    });
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    let signature = URL_SAFE_NO_PAD.encode(format!("signature-{serial}"));
    format!("{header}.{payload}.{signature}")
}

// =============================================================================
// Errors and authentication
// =============================================================================

struct ApiError(StatusCode, Value);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn detail(status: StatusCode, message: &str) -> ApiError {
    ApiError(status, json!({ "detail": message }))
}

fn field_error(field: &str, message: &str) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, json!({ field: [message] }))
}

fn not_found() -> ApiError {
    detail(StatusCode::NOT_FOUND, "Not found.")
}

fn forbidden() -> ApiError {
    detail(
        StatusCode::FORBIDDEN,
        "You do not have permission to perform this action.",
    )
}

#[derive(Clone, Copy)]
struct Caller {
    id: i64,
    admin: bool,
}

fn caller(db: &Db, headers: &HeaderMap) -> ApiResult<Caller> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            detail(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            )
        })?;

    db.sessions
        .get(token)
        .and_then(|id| db.users.get(id))
        .map(|u| Caller {
            id: u.id,
            admin: u.rol == "admin",
        })
        .ok_or_else(|| {
            detail(
                StatusCode::UNAUTHORIZED,
                "Given token not valid for any token type",
            )
        })
}

fn require_admin(caller: Caller) -> ApiResult<()> {
    if caller.admin { Ok(()) } else { Err(forbidden()) }
}

fn to_json<T: Serialize>(value: &T) -> Json<Value> {
    Json(serde_json::to_value(value).unwrap_or(Value::Null))
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/usuarios/login/", post(login))
        .route("/usuarios/", get(list_users).post(create_user))
        .route("/usuarios/me/", get(me))
        .route(
            "/usuarios/{id}/",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/projects/", get(list_projects).post(create_project))
        .route(
            "/projects/{id}/",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/tasks/", get(list_tasks).post(create_task))
        .route("/tasks/filter_by_project/", get(filter_tasks))
        .route(
            "/tasks/{id}/",
            get(get_task)
                .put(update_task)
                .patch(patch_task)
                .delete(delete_task),
        )
        .route("/alertas/", get(list_alerts).post(create_alert))
        .route("/alertas/update-visibility/", patch(hide_alerts))
        .route(
            "/alertas/{id}/",
            get(get_alert).put(update_alert).delete(delete_alert),
        )
        .layer(middleware::from_fn_with_state(Arc::clone(&state), track))
        .with_state(state)
}

async fn track(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    lock(&state.requests).push(format!("{} {}", request.method(), request.uri().path()));

    if state.outage.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    }

    let latency = *lock(&state.latency);
    if request.method() == Method::GET && !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    next.run(request).await
}

// =============================================================================
// Users
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    let user = db
        .users
        .values()
        .find(|u| u.username == body.username)
        .cloned()
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "User does not exist"))?;

    if user.password != body.password {
        return Err(detail(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let (token, refresh) = state.issue(&mut db, &user);
    Ok(Json(json!({ "refresh": refresh, "token": token })))
}

#[derive(Deserialize)]
struct UserBody {
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    rol: Option<String>,
}

async fn create_user(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<UserBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut db = state.db();
    let admin = caller(&db, &headers).is_ok_and(|c| c.admin);

    if body.username.trim().is_empty() {
        return Err(field_error("username", "This field may not be blank."));
    }
    if db.users.values().any(|u| u.username == body.username) {
        return Err(field_error(
            "username",
            "A user with that username already exists.",
        ));
    }
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| field_error("password", "This field is required."))?;

    let id = next_id(&db.users);
    let user = UserRow {
        id,
        username: body.username,
        email: body.email.unwrap_or_default(),
        nombre: body.nombre.unwrap_or_default(),
        rol: if admin {
            body.rol.unwrap_or_else(|| "usuario".to_string())
        } else {
            "usuario".to_string()
        },
        password,
    };
    db.users.insert(id, user.clone());

    let (token, refresh) = state.issue(&mut db, &user);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "refresh": refresh, "token": token })),
    ))
}

async fn list_users(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    require_admin(caller(&db, &headers)?)?;
    Ok(to_json(&db.users.values().collect::<Vec<_>>()))
}

async fn me(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    let user = db.users.get(&caller.id).ok_or_else(not_found)?;
    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "nombre": user.nombre,
        "rol": user.rol,
    })))
}

async fn get_user(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    if !caller.admin && caller.id != id {
        return Err(forbidden());
    }
    db.users.get(&id).map(to_json).ok_or_else(not_found)
}

async fn update_user(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UserBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    let caller = caller(&db, &headers)?;
    if !caller.admin && caller.id != id {
        return Err(forbidden());
    }
    if db.users.values().any(|u| u.id != id && u.username == body.username) {
        return Err(field_error(
            "username",
            "A user with that username already exists.",
        ));
    }

    let user = db.users.get_mut(&id).ok_or_else(not_found)?;
    user.username = body.username;
    if let Some(email) = body.email {
        user.email = email;
    }
    if let Some(nombre) = body.nombre {
        user.nombre = nombre;
    }
    if let Some(rol) = body.rol {
        if rol != user.rol && !caller.admin {
            return Err(forbidden());
        }
        user.rol = rol;
    }
    if let Some(password) = body.password {
        user.password = password;
    }
    Ok(to_json(&*user))
}

async fn delete_user(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    db.users.remove(&id).ok_or_else(not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Deserialize)]
struct ProjectBody {
    nombre: String,
    #[serde(default)]
    descripcion: String,
    fecha_inicio: String,
    fecha_finalizacion: String,
    usuario: i64,
}

fn validate_project(db: &Db, body: &ProjectBody) -> ApiResult<()> {
    if body.nombre.trim().is_empty() {
        return Err(field_error("nombre", "This field may not be blank."));
    }
    let parse = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            field_error(
                field,
                "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
            )
        })
    };
    let start = parse("fecha_inicio", &body.fecha_inicio)?;
    let end = parse("fecha_finalizacion", &body.fecha_finalizacion)?;
    if end < start {
        return Err(field_error(
            "non_field_errors",
            "End date must not be before start date.",
        ));
    }
    if !db.users.contains_key(&body.usuario) {
        return Err(field_error(
            "usuario",
            &format!("Invalid pk \"{}\" - object does not exist.", body.usuario),
        ));
    }
    Ok(())
}

async fn list_projects(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    caller(&db, &headers)?;
    Ok(to_json(&db.projects.values().collect::<Vec<_>>()))
}

async fn get_project(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    caller(&db, &headers)?;
    db.projects.get(&id).map(to_json).ok_or_else(not_found)
}

async fn create_project(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<ProjectBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    validate_project(&db, &body)?;

    let id = next_id(&db.projects);
    let project = ProjectRow {
        id,
        nombre: body.nombre,
        descripcion: body.descripcion,
        fecha_inicio: body.fecha_inicio,
        fecha_finalizacion: body.fecha_finalizacion,
        usuario: body.usuario,
    };
    let response = to_json(&project);
    db.projects.insert(id, project);
    Ok((StatusCode::CREATED, response))
}

async fn update_project(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<ProjectBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    validate_project(&db, &body)?;

    let project = db.projects.get_mut(&id).ok_or_else(not_found)?;
    project.nombre = body.nombre;
    project.descripcion = body.descripcion;
    project.fecha_inicio = body.fecha_inicio;
    project.fecha_finalizacion = body.fecha_finalizacion;
    project.usuario = body.usuario;
    Ok(to_json(&*project))
}

async fn delete_project(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    db.projects.remove(&id).ok_or_else(not_found)?;
    db.tasks.retain(|_, t| t.proyecto != id);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Tasks
// =============================================================================

#[derive(Deserialize)]
struct TaskBody {
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    descripcion: Option<String>,
    #[serde(default)]
    estado: Option<String>,
    #[serde(default)]
    proyecto: Option<i64>,
    #[serde(default)]
    asignada_a: Option<i64>,
}

impl TaskBody {
    fn validate(&self, db: &Db) -> ApiResult<()> {
        if self.nombre.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(field_error("nombre", "This field may not be blank."));
        }
        if let Some(estado) = &self.estado
            && !STATUSES.contains(&estado.as_str())
        {
            return Err(field_error(
                "estado",
                &format!("\"{estado}\" is not a valid choice."),
            ));
        }
        if let Some(project) = self.proyecto
            && !db.projects.contains_key(&project)
        {
            return Err(field_error(
                "proyecto",
                &format!("Invalid pk \"{project}\" - object does not exist."),
            ));
        }
        if let Some(user) = self.asignada_a
            && !db.users.contains_key(&user)
        {
            return Err(field_error(
                "asignada_a",
                &format!("Invalid pk \"{user}\" - object does not exist."),
            ));
        }
        Ok(())
    }

    fn apply(self, task: &mut TaskRow) {
        if let Some(nombre) = self.nombre {
            task.nombre = nombre;
        }
        if let Some(descripcion) = self.descripcion {
            task.descripcion = descripcion;
        }
        if let Some(estado) = self.estado {
            task.estado = estado;
        }
        if let Some(proyecto) = self.proyecto {
            task.proyecto = proyecto;
        }
        if let Some(asignada_a) = self.asignada_a {
            task.asignada_a = asignada_a;
        }
    }
}

fn task_visible(caller: Caller, task: &TaskRow) -> bool {
    caller.admin || task.asignada_a == caller.id
}

/// Projects with their visible tasks nested under `tareas`. Non-admins only
/// get projects they have tasks in.
async fn list_tasks(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;

    let mut groups = Vec::new();
    for project in db.projects.values() {
        let tasks: Vec<Value> = db
            .tasks
            .values()
            .filter(|t| t.proyecto == project.id && task_visible(caller, t))
            .map(|t| {
                json!({
                    "id": t.id,
                    "nombre": t.nombre,
                    "descripcion": t.descripcion,
                    "estado": t.estado,
                    "asignada_a": t.asignada_a,
                })
            })
            .collect();
        if tasks.is_empty() && !caller.admin {
            continue;
        }

        let mut group = serde_json::to_value(project).unwrap_or(Value::Null);
        if let Value::Object(fields) = &mut group {
            fields.insert("tareas".to_string(), Value::Array(tasks));
        }
        groups.push(group);
    }
    Ok(Json(Value::Array(groups)))
}

async fn filter_tasks(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    let project: i64 = query
        .get("project_id")
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| detail(StatusCode::BAD_REQUEST, "project_id is required"))?;

    let tasks: Vec<&TaskRow> = db
        .tasks
        .values()
        .filter(|t| t.proyecto == project && task_visible(caller, t))
        .collect();
    Ok(to_json(&tasks))
}

async fn get_task(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    db.tasks
        .get(&id)
        .filter(|t| task_visible(caller, t))
        .map(to_json)
        .ok_or_else(not_found)
}

async fn create_task(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<TaskBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    body.validate(&db)?;

    let nombre = body
        .nombre
        .clone()
        .ok_or_else(|| field_error("nombre", "This field is required."))?;
    let proyecto = body
        .proyecto
        .ok_or_else(|| field_error("proyecto", "This field is required."))?;
    let asignada_a = body
        .asignada_a
        .ok_or_else(|| field_error("asignada_a", "This field is required."))?;

    let id = next_id(&db.tasks);
    let mut task = TaskRow {
        id,
        nombre,
        descripcion: String::new(),
        estado: "pendiente".to_string(),
        proyecto,
        asignada_a,
    };
    body.apply(&mut task);
    let response = to_json(&task);
    db.tasks.insert(id, task);
    Ok((StatusCode::CREATED, response))
}

async fn update_task(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    body.validate(&db)?;

    let task = db.tasks.get_mut(&id).ok_or_else(not_found)?;
    body.apply(task);
    Ok(to_json(&*task))
}

/// Assignees may change the status of their own tasks; anything else needs
/// an administrator.
async fn patch_task(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    let caller = caller(&db, &headers)?;
    body.validate(&db)?;

    let task = db
        .tasks
        .get_mut(&id)
        .filter(|t| task_visible(caller, t))
        .ok_or_else(not_found)?;
    let status_only = body.nombre.is_none()
        && body.descripcion.is_none()
        && body.proyecto.is_none()
        && body.asignada_a.is_none();
    if !caller.admin && !status_only {
        return Err(forbidden());
    }

    body.apply(task);
    Ok(to_json(&*task))
}

async fn delete_task(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    db.tasks.remove(&id).ok_or_else(not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Alerts
// =============================================================================

#[derive(Deserialize)]
struct NewAlertBody {
    usuario: i64,
    mensaje: String,
}

#[derive(Deserialize)]
struct AlertMessageBody {
    mensaje: String,
}

#[derive(Deserialize)]
struct VisibilityBody {
    #[serde(default)]
    ids: Vec<i64>,
}

fn alert_visible_to(caller: Caller, alert: &AlertRow) -> bool {
    caller.admin || alert.usuario == caller.id
}

/// The caller's own alerts, newest first.
async fn list_alerts(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    let alerts: Vec<&AlertRow> = db
        .alerts
        .values()
        .rev()
        .filter(|a| a.usuario == caller.id)
        .collect();
    Ok(to_json(&alerts))
}

async fn get_alert(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let db = state.db();
    let caller = caller(&db, &headers)?;
    db.alerts
        .get(&id)
        .filter(|a| alert_visible_to(caller, a))
        .map(to_json)
        .ok_or_else(not_found)
}

async fn create_alert(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<NewAlertBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    if body.mensaje.trim().is_empty() {
        return Err(field_error("mensaje", "This field may not be blank."));
    }
    if !db.users.contains_key(&body.usuario) {
        return Err(field_error(
            "usuario",
            &format!("Invalid pk \"{}\" - object does not exist.", body.usuario),
        ));
    }

    let id = next_id(&db.alerts);
    let alert = AlertRow {
        id,
        usuario: body.usuario,
        mensaje: body.mensaje,
        fecha_creacion: Utc::now().to_rfc3339(),
        visible: true,
    };
    let response = to_json(&alert);
    db.alerts.insert(id, alert);
    Ok((StatusCode::CREATED, response))
}

async fn update_alert(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<AlertMessageBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    require_admin(caller(&db, &headers)?)?;
    if body.mensaje.trim().is_empty() {
        return Err(field_error("mensaje", "This field may not be blank."));
    }
    let alert = db.alerts.get_mut(&id).ok_or_else(not_found)?;
    alert.mensaje = body.mensaje;
    Ok(to_json(&*alert))
}

async fn delete_alert(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut db = state.db();
    let caller = caller(&db, &headers)?;
    if !db.alerts.get(&id).is_some_and(|a| alert_visible_to(caller, a)) {
        return Err(not_found());
    }
    db.alerts.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

/// Hide the listed alerts. Ids the caller cannot see are skipped.
async fn hide_alerts(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<VisibilityBody>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db();
    let caller = caller(&db, &headers)?;
    if body.ids.is_empty() {
        return Err(field_error("ids", "This list may not be empty."));
    }

    let mut updated = 0;
    for id in &body.ids {
        if let Some(alert) = db.alerts.get_mut(id)
            && alert_visible_to(caller, alert)
        {
            alert.visible = false;
            updated += 1;
        }
    }
    Ok(Json(json!({ "updated": updated })))
}
