//! Build/parse round trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the core client's
//! `build_*`/`parse_*` pairs over real HTTP using ureq. Validates that request
//! building, token attachment and envelope interpretation work end-to-end.

use blog_api_core::http::AUTHORIZATION;
use blog_api_core::{
    ApiError, AuthContext, BlogClient, HttpMethod, HttpResponse, LoginRequest, Project, ProjectQuery, User,
    UserQuery,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: blog_api_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.call()
        }
        (HttpMethod::Post, Some(body)) => {
            let mut builder = agent.post(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.send(body.as_bytes())
        }
        (method, _) => panic!("unexpected method {method:?}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

#[test]
fn user_and_project_lifecycle() {
    // Step 1: start mock server on a random port.
    let addr = start_server();
    let client = BlogClient::new(&format!("http://{addr}/api"));

    // Step 2: unauthenticated list is rejected with the server's message.
    let req = client
        .build_project_list(&AuthContext::anonymous(), &ProjectQuery::default())
        .unwrap();
    assert_eq!(req.header(AUTHORIZATION), None);
    let err = client.parse_project_list(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Application { status: 401, .. }));
    assert_eq!(err.to_string(), "missing token");

    // Step 3: login.
    let credentials = LoginRequest {
        username: mock_server::ADMIN_USERNAME.to_string(),
        password: mock_server::ADMIN_PASSWORD.to_string(),
    };
    let req = client.build_login(&credentials).unwrap();
    assert_eq!(req.header(AUTHORIZATION), None);
    let token = client.parse_login(execute(req)).unwrap().token;
    let auth = AuthContext::with_token(token.clone());

    // Step 4: add a project.
    let project = Project {
        project_name: "blog".to_string(),
        description: "personal site".to_string(),
        url: "https://example.com".to_string(),
        ..Project::default()
    };
    let req = client.build_add_project(&auth, &project).unwrap();
    assert_eq!(req.header(AUTHORIZATION), Some(token.as_str()));
    assert_eq!(client.parse_ack(execute(req)).unwrap(), "project added");

    // Step 5: list.
    let req = client.build_project_list(&auth, &ProjectQuery::default()).unwrap();
    let page = client.parse_project_list(execute(req)).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].project_name, "blog");
    let id = page.list[0].id;

    // Step 6: invalid edit surfaces the validation message.
    let too_long = Project {
        id,
        project_name: "x".repeat(21),
        ..Project::default()
    };
    let req = client.build_edit_project(&auth, &too_long).unwrap();
    let err = client.parse_ack(execute(req)).unwrap_err();
    assert_eq!(err.to_string(), "project name must be 1-20 characters");

    // Step 7: delete, then delete again.
    let req = client.build_delete_project(&auth, id).unwrap();
    client.parse_ack(execute(req)).unwrap();
    let req = client.build_delete_project(&auth, id).unwrap();
    let err = client.parse_ack(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Application { status: 404, .. }));

    // Step 8: register a user, then find them.
    let user = User {
        username: "writer".to_string(),
        password: Some("Writer@123".to_string()),
        email: "writer@example.com".to_string(),
        ..User::default()
    };
    let req = client.build_register(&user).unwrap();
    client.parse_ack(execute(req)).unwrap();

    let query = UserQuery {
        username: Some("writ".to_string()),
        ..UserQuery::default()
    };
    let req = client.build_user_list(&auth, &query).unwrap();
    let page = client.parse_user_list(execute(req)).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].email, "writer@example.com");
    assert_eq!(page.list[0].password, None);

    let req = client.build_user_info(&auth, page.list[0].id).unwrap();
    let info = client.parse_user_info(execute(req)).unwrap();
    assert_eq!(info.username, "writer");
    assert_eq!(info.role, "0");
}
