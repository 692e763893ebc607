use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin@123";
/// Password a reset assigns.
pub const RESET_PASSWORD: &str = "123456";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
    pub email: String,
    pub real_name: String,
    pub register_time: String,
    pub avatar: String,
    pub creator_id: i64,
    pub status: String,
    pub role: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub cover_image: String,
    pub intro: String,
    pub keywords: String,
    pub content: String,
    pub views: u64,
    pub creator_id: i64,
    pub create_time: String,
    pub status: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub description: String,
    pub logo: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct IdRequest {
    pub id: i64,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub page_num: Option<usize>,
    pub page_size: Option<usize>,
    pub keyword: Option<String>,
    pub username: Option<String>,
    pub status: Option<String>,
}

#[derive(Default)]
pub struct Store {
    users: BTreeMap<i64, User>,
    articles: BTreeMap<i64, Article>,
    projects: BTreeMap<i64, Project>,
    tokens: HashMap<String, i64>,
    next_id: i64,
}

impl Store {
    /// A store holding only the admin account.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        let id = store.allocate_id();
        store.users.insert(
            id,
            User {
                id,
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                register_time: now(),
                status: "0".to_string(),
                role: "1".to_string(),
                ..User::default()
            },
        );
        store
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|u| u.username == username)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// The authenticated caller, inserted by `require_token`.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub i64);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let protected = Router::new()
        .route("/user/add", post(add_user))
        .route("/user/list", post(user_list))
        .route("/user/info", post(user_info))
        .route("/user/edit", post(edit_user))
        .route("/user/resetPassword", post(reset_password))
        .route("/user/changePassword", post(change_password))
        .route("/article/list", post(article_list))
        .route("/article/details", post(article_details))
        .route("/article/add", post(add_article))
        .route("/article/edit", post(edit_article))
        .route("/article/delete", post(delete_article))
        .route("/project/list", post(project_list))
        .route("/project/details", post(project_details))
        .route("/project/add", post(add_project))
        .route("/project/edit", post(edit_project))
        .route("/project/delete", post(delete_project))
        .layer(middleware::from_fn_with_state(db.clone(), require_token));
    let api = Router::new()
        .route("/user/login", post(login))
        .route("/user/register", post(register))
        .merge(protected);
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Every response, success or failure, is `{status, message, data}` with the
/// HTTP status mirrored in the envelope.
pub fn envelope(status: StatusCode, message: &str, data: Value) -> Response {
    let data = if data.is_null() { json!({}) } else { data };
    let body = json!({
        "status": status.as_u16(),
        "message": message,
        "data": data,
    });
    (status, Json(body)).into_response()
}

fn ok(message: &str, data: Value) -> Response {
    envelope(StatusCode::OK, message, data)
}

fn fail(status: StatusCode, message: &str) -> Response {
    envelope(status, message, Value::Null)
}

fn invalid_input(rejection: JsonRejection) -> Response {
    fail(StatusCode::BAD_REQUEST, &format!("invalid input: {}", rejection.body_text()))
}

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

fn page<T: Serialize>(items: Vec<T>, query: &ListQuery) -> Value {
    let total = items.len();
    let list: Vec<T> = match (query.page_num, query.page_size) {
        (Some(num), Some(size)) => match num.saturating_sub(1).checked_mul(size) {
            Some(offset) => items.into_iter().skip(offset).take(size).collect(),
            None => Vec::new(),
        },
        _ => items,
    };
    json!({ "total": total, "list": list })
}

fn matches_text(haystack: &[&str], needle: &Option<String>) -> bool {
    match needle.as_deref() {
        None | Some("") => true,
        Some(needle) => haystack.iter().any(|h| h.contains(needle)),
    }
}

fn matches_status(status: &str, wanted: &Option<String>) -> bool {
    match wanted.as_deref() {
        None | Some("") => true,
        Some(wanted) => status == wanted,
    }
}

pub async fn require_token(State(db): State<Db>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).to_string())
        .filter(|v| !v.is_empty());
    let Some(token) = token else {
        tracing::debug!(path = %request.uri().path(), "missing token");
        return fail(StatusCode::UNAUTHORIZED, "missing token");
    };
    let user_id = db.read().await.tokens.get(&token).copied();
    match user_id {
        Some(id) => {
            request.extensions_mut().insert(CurrentUser(id));
            next.run(request).await
        }
        None => fail(StatusCode::UNAUTHORIZED, "invalid token"),
    }
}

fn validate_username(username: &str) -> Result<(), Response> {
    if !(1..=20).contains(&username.chars().count()) {
        return Err(fail(StatusCode::BAD_REQUEST, "username must be 1-20 characters"));
    }
    Ok(())
}

fn validate_user(user: &User) -> Result<(), Response> {
    validate_username(&user.username)?;
    let password_len = user.password.chars().count();
    if !(6..=30).contains(&password_len) {
        return Err(fail(StatusCode::BAD_REQUEST, "password must be 6-30 characters"));
    }
    Ok(())
}

async fn login(State(db): State<Db>, payload: Result<Json<Credentials>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let mut store = db.write().await;
    let user_id = store
        .users
        .values()
        .find(|u| u.username == input.username && u.password == input.password)
        .map(|u| u.id);
    match user_id {
        Some(id) => {
            let token = Uuid::new_v4().to_string();
            store.tokens.insert(token.clone(), id);
            tracing::info!(user_id = id, "login");
            ok("login successful", json!({ "token": token }))
        }
        None => fail(StatusCode::UNAUTHORIZED, "invalid username or password"),
    }
}

async fn register(State(db): State<Db>, payload: Result<Json<User>, JsonRejection>) -> Response {
    let Json(mut user) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_user(&user) {
        return resp;
    }
    let mut store = db.write().await;
    if store.username_taken(&user.username) {
        return fail(StatusCode::BAD_REQUEST, "username already exists");
    }
    user.id = store.allocate_id();
    user.register_time = now();
    user.status = "0".to_string();
    user.role = "0".to_string();
    user.creator_id = 0;
    store.users.insert(user.id, user);
    ok("registered", Value::Null)
}

async fn add_user(
    State(db): State<Db>,
    Extension(CurrentUser(creator)): Extension<CurrentUser>,
    payload: Result<Json<User>, JsonRejection>,
) -> Response {
    let Json(mut user) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_user(&user) {
        return resp;
    }
    if !matches!(user.role.as_str(), "0" | "1") {
        return fail(StatusCode::BAD_REQUEST, "invalid user role");
    }
    let mut store = db.write().await;
    if store.username_taken(&user.username) {
        return fail(StatusCode::BAD_REQUEST, "username already exists");
    }
    user.id = store.allocate_id();
    user.register_time = now();
    user.status = "0".to_string();
    user.creator_id = creator;
    store.users.insert(user.id, user);
    ok("user added", Value::Null)
}

async fn user_list(State(db): State<Db>, payload: Result<Json<ListQuery>, JsonRejection>) -> Response {
    let Json(query) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let store = db.read().await;
    let users: Vec<User> = store
        .users
        .values()
        .rev()
        .filter(|u| matches_text(&[u.username.as_str()], &query.username))
        .filter(|u| matches_status(&u.status, &query.status))
        .cloned()
        .collect();
    ok("user list", page(users, &query))
}

async fn user_info(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let store = db.read().await;
    match store.users.get(&input.id) {
        Some(user) => ok("user info", json!(user)),
        None => fail(StatusCode::NOT_FOUND, "user not found"),
    }
}

async fn edit_user(State(db): State<Db>, payload: Result<Json<User>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_username(&input.username) {
        return resp;
    }
    if !matches!(input.status.as_str(), "0" | "1" | "2") {
        return fail(StatusCode::BAD_REQUEST, "invalid user status");
    }
    if !matches!(input.role.as_str(), "0" | "1") {
        return fail(StatusCode::BAD_REQUEST, "invalid user role");
    }
    let mut store = db.write().await;
    let Some(current) = store.users.get(&input.id).map(|u| u.username.clone()) else {
        return fail(StatusCode::NOT_FOUND, "user not found");
    };
    if current != input.username && store.username_taken(&input.username) {
        return fail(StatusCode::BAD_REQUEST, "username already exists");
    }
    let Some(user) = store.users.get_mut(&input.id) else {
        return fail(StatusCode::NOT_FOUND, "user not found");
    };
    user.username = input.username;
    user.phone_number = input.phone_number;
    user.email = input.email;
    user.real_name = input.real_name;
    user.avatar = input.avatar;
    user.status = input.status;
    user.role = input.role;
    ok("user updated", Value::Null)
}

async fn reset_password(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let mut store = db.write().await;
    match store.users.get_mut(&input.id) {
        Some(user) => {
            user.password = RESET_PASSWORD.to_string();
            ok("password reset", json!({ "newPassword": RESET_PASSWORD }))
        }
        None => fail(StatusCode::NOT_FOUND, "user not found"),
    }
}

async fn change_password(
    State(db): State<Db>,
    Extension(CurrentUser(id)): Extension<CurrentUser>,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if input.password.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "old password is required");
    }
    if !(6..=30).contains(&input.new_password.chars().count()) {
        return fail(StatusCode::BAD_REQUEST, "new password must be 6-30 characters");
    }
    let mut store = db.write().await;
    let Some(user) = store.users.get_mut(&id) else {
        return fail(StatusCode::UNAUTHORIZED, "user authentication failed");
    };
    if user.password != input.password {
        return fail(StatusCode::UNAUTHORIZED, "old password is incorrect");
    }
    user.password = input.new_password;
    ok("password changed", Value::Null)
}

fn validate_article(article: &Article) -> Result<(), Response> {
    let title_len = article.title.chars().count();
    if !(1..=50).contains(&title_len) {
        return Err(fail(StatusCode::BAD_REQUEST, "article title must be 1-50 characters"));
    }
    if !matches!(article.status.as_str(), "0" | "1" | "2") {
        return Err(fail(StatusCode::BAD_REQUEST, "invalid article status"));
    }
    Ok(())
}

async fn article_list(State(db): State<Db>, payload: Result<Json<ListQuery>, JsonRejection>) -> Response {
    let Json(query) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let store = db.read().await;
    let rows: Vec<Value> = store
        .articles
        .values()
        .rev()
        .filter(|a| matches_text(&[a.title.as_str(), a.intro.as_str(), a.keywords.as_str()], &query.keyword))
        .filter(|a| matches_status(&a.status, &query.status))
        .map(|a| {
            let creator = store
                .users
                .get(&a.creator_id)
                .map(|u| u.username.clone())
                .unwrap_or_default();
            json!({
                "id": a.id,
                "title": a.title,
                "intro": a.intro,
                "cover_image": a.cover_image,
                "keywords": a.keywords,
                "views": a.views,
                "creator_id": a.creator_id,
                "create_time": a.create_time,
                "status": a.status,
                "creator": creator,
            })
        })
        .collect();
    ok("article list", page(rows, &query))
}

async fn article_details(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let mut store = db.write().await;
    match store.articles.get_mut(&input.id) {
        Some(article) => {
            article.views += 1;
            ok("article details", json!(article))
        }
        None => fail(StatusCode::NOT_FOUND, "article not found"),
    }
}

async fn add_article(
    State(db): State<Db>,
    Extension(CurrentUser(creator)): Extension<CurrentUser>,
    payload: Result<Json<Article>, JsonRejection>,
) -> Response {
    let Json(mut article) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_article(&article) {
        return resp;
    }
    let mut store = db.write().await;
    article.id = store.allocate_id();
    article.views = 0;
    article.creator_id = creator;
    article.create_time = now();
    store.articles.insert(article.id, article);
    ok("article added", Value::Null)
}

async fn edit_article(State(db): State<Db>, payload: Result<Json<Article>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_article(&input) {
        return resp;
    }
    let mut store = db.write().await;
    let Some(article) = store.articles.get_mut(&input.id) else {
        return fail(StatusCode::NOT_FOUND, "article not found");
    };
    article.title = input.title;
    article.cover_image = input.cover_image;
    article.intro = input.intro;
    article.keywords = input.keywords;
    article.content = input.content;
    article.status = input.status;
    ok("article updated", Value::Null)
}

async fn delete_article(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let mut store = db.write().await;
    match store.articles.remove(&input.id) {
        Some(_) => ok("article deleted", Value::Null),
        None => fail(StatusCode::NOT_FOUND, "article not found"),
    }
}

fn validate_project(project: &Project) -> Result<(), Response> {
    let name_len = project.project_name.chars().count();
    if !(1..=20).contains(&name_len) {
        return Err(fail(StatusCode::BAD_REQUEST, "project name must be 1-20 characters"));
    }
    if project.description.chars().count() > 100 {
        return Err(fail(StatusCode::BAD_REQUEST, "project description must be at most 100 characters"));
    }
    Ok(())
}

async fn project_list(State(db): State<Db>, payload: Result<Json<ListQuery>, JsonRejection>) -> Response {
    let Json(query) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let store = db.read().await;
    let projects: Vec<Project> = store
        .projects
        .values()
        .rev()
        .filter(|p| matches_text(&[p.project_name.as_str(), p.description.as_str()], &query.keyword))
        .cloned()
        .collect();
    ok("project list", page(projects, &query))
}

async fn project_details(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let store = db.read().await;
    match store.projects.get(&input.id) {
        Some(project) => ok("project details", json!(project)),
        None => fail(StatusCode::NOT_FOUND, "project not found"),
    }
}

async fn add_project(State(db): State<Db>, payload: Result<Json<Project>, JsonRejection>) -> Response {
    let Json(mut project) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_project(&project) {
        return resp;
    }
    let mut store = db.write().await;
    project.id = store.allocate_id();
    store.projects.insert(project.id, project);
    ok("project added", Value::Null)
}

async fn edit_project(State(db): State<Db>, payload: Result<Json<Project>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    if let Err(resp) = validate_project(&input) {
        return resp;
    }
    let mut store = db.write().await;
    match store.projects.get_mut(&input.id) {
        Some(project) => {
            *project = input;
            ok("project updated", Value::Null)
        }
        None => fail(StatusCode::NOT_FOUND, "project not found"),
    }
}

async fn delete_project(State(db): State<Db>, payload: Result<Json<IdRequest>, JsonRejection>) -> Response {
    let Json(input) = match payload {
        Ok(p) => p,
        Err(e) => return invalid_input(e),
    };
    let mut store = db.write().await;
    match store.projects.remove(&input.id) {
        Some(_) => ok("project deleted", Value::Null),
        None => fail(StatusCode::NOT_FOUND, "project not found"),
    }
}
