//! End-to-end tests driving the full router over the in-memory backend.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use noteful_api::auth::TokenService;
use noteful_api::config::ServerConfig;
use noteful_api::{router, AppState};
use noteful_db::{Database, PublicUser};

struct TestApp {
    app: Router,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let config = ServerConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("memory://".to_string()),
            "JWT_SECRET" => Some("test-secret".to_string()),
            _ => None,
        });
        Self {
            app: router(AppState::new(Database::in_memory(), config)),
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    async fn register(&self, username: &str) -> TestResponse {
        self.call(
            "POST",
            "/api/users",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        )
        .await
    }

    async fn login(&self, username: &str) -> String {
        let res = self
            .call(
                "POST",
                "/api/auth-tokens",
                None,
                Some(json!({ "username": username, "password": "password123" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["authToken"]
            .as_str()
            .expect("authToken")
            .to_string()
    }

    /// Register and log in, returning a bearer token.
    async fn user(&self, username: &str) -> String {
        assert_eq!(self.register(username).await.status, StatusCode::CREATED);
        self.login(username).await
    }

    async fn create(&self, token: &str, resource: &str, body: Value) -> Value {
        let res = self
            .call("POST", &format!("/api/{}", resource), Some(token), Some(body))
            .await;
        assert_eq!(
            res.status,
            StatusCode::CREATED,
            "create {} failed: {}",
            resource,
            res.body
        );
        res.body
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn test_end_to_end_folder_cascade() {
    let app = TestApp::new();

    let res = app.register("alice").await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["username"], "alice");
    assert!(res.body["id"].is_string());
    assert!(res.body.get("password").is_none());
    assert!(res.body.get("passwordHash").is_none());
    assert_eq!(
        res.headers[header::LOCATION],
        format!("/api/users/{}", id_of(&res.body))
    );

    let token = app.login("alice").await;
    assert!(!token.is_empty());

    let res = app
        .call("POST", "/api/folders", Some(&token), Some(json!({ "name": "Work" })))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let work = id_of(&res.body);
    assert_eq!(
        res.headers[header::LOCATION],
        format!("/api/folders/{}", work)
    );

    let note = app
        .create(&token, "notes", json!({ "title": "T", "folderId": work }))
        .await;
    assert_eq!(note["folderId"], work.as_str());
    assert_eq!(note["tags"], json!([]));
    let note_id = id_of(&note);

    let res = app
        .call("DELETE", &format!("/api/folders/{}", work), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_null());

    let res = app
        .call("GET", &format!("/api/notes/{}", note_id), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["folderId"].is_null());

    let res = app
        .call("GET", &format!("/api/folders/{}", work), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::new();

    let cases = [
        (json!({ "password": "password123" }), "username", "Missing field"),
        (json!({ "username": "bob" }), "password", "Missing field"),
        (
            json!({ "username": 42, "password": "password123" }),
            "username",
            "Incorrect field type: expected string",
        ),
        (
            json!({ "username": " bob", "password": "password123" }),
            "username",
            "Cannot start or end with whitespace",
        ),
        (
            json!({ "username": "bob", "password": "short" }),
            "password",
            "Must be at least 8 characters long",
        ),
        (
            json!({ "username": "bob", "password": "x".repeat(73) }),
            "password",
            "Must be at most 72 characters long",
        ),
    ];

    for (body, location, message) in cases {
        let res = app.call("POST", "/api/users", None, Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert_eq!(res.body["reason"], "ValidationError");
        assert_eq!(res.body["location"], location);
        assert_eq!(res.body["error"], message);
    }
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let app = TestApp::new();
    assert_eq!(app.register("carol").await.status, StatusCode::CREATED);

    let res = app.register("carol").await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["location"], "username");
    assert_eq!(res.body["error"], "Username already taken");
}

#[tokio::test]
async fn test_fullname_is_trimmed() {
    let app = TestApp::new();
    let res = app
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({ "username": "dave", "password": "password123", "fullname": "  Dave D  " })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["fullname"], "Dave D");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("erin").await;

    let wrong_password = app
        .call(
            "POST",
            "/api/auth-tokens",
            None,
            Some(json!({ "username": "erin", "password": "wrong-password" })),
        )
        .await;
    let unknown_user = app
        .call(
            "POST",
            "/api/auth-tokens",
            None,
            Some(json!({ "username": "nobody", "password": "password123" })),
        )
        .await;
    let missing_fields = app
        .call("POST", "/api/auth-tokens", None, Some(json!({})))
        .await;

    for res in [&wrong_password, &unknown_user, &missing_fields] {
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["error"], "Incorrect username or password");
    }
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let app = TestApp::new();

    for uri in ["/api/notes", "/api/folders", "/api/tags"] {
        let res = app.call("GET", uri, None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let res = app.call("GET", "/api/notes", Some("not-a-jwt"), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Auth is checked before the body is looked at.
    let res = app
        .call("POST", "/api/notes", None, Some(json!({})))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_refresh() {
    let app = TestApp::new();
    let token = app.user("frank").await;

    let res = app
        .call("POST", "/api/auth-tokens/refresh", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let refreshed = res.body["authToken"].as_str().unwrap().to_string();

    let res = app.call("GET", "/api/notes", Some(&refreshed), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.call("POST", "/api/auth-tokens/refresh", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_resources_are_not_found() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let folder = id_of(&app.create(&alice, "folders", json!({ "name": "Private" })).await);
    let tag = id_of(&app.create(&alice, "tags", json!({ "name": "secret" })).await);
    let note = id_of(&app.create(&alice, "notes", json!({ "title": "diary" })).await);

    for (resource, id) in [("folders", &folder), ("tags", &tag), ("notes", &note)] {
        let uri = format!("/api/{}/{}", resource, id);

        let res = app.call("GET", &uri, Some(&bob), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(res.body["error"], "Not Found");

        let body = json!({ "name": "mine now", "title": "mine now" });
        let res = app.call("PUT", &uri, Some(&bob), Some(body)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "PUT {}", uri);

        let res = app.call("DELETE", &uri, Some(&bob), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "DELETE {}", uri);

        let res = app.call("GET", &uri, Some(&alice), None).await;
        assert_eq!(res.status, StatusCode::OK, "owner GET {}", uri);
    }

    for resource in ["folders", "tags", "notes"] {
        let res = app
            .call("GET", &format!("/api/{}", resource), Some(&bob), None)
            .await;
        assert_eq!(res.body, json!([]));
    }
}

#[tokio::test]
async fn test_note_references_must_belong_to_caller() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let bobs_folder = id_of(&app.create(&bob, "folders", json!({ "name": "Bob's" })).await);
    let bobs_tag = id_of(&app.create(&bob, "tags", json!({ "name": "bob" })).await);

    let res = app
        .call(
            "POST",
            "/api/notes",
            Some(&alice),
            Some(json!({ "title": "sneaky", "folderId": bobs_folder })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "The `folderId` does not belong to the user");

    let res = app
        .call(
            "POST",
            "/api/notes",
            Some(&alice),
            Some(json!({ "title": "sneaky", "tags": [bobs_tag] })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["error"],
        "The `tags` array contains a tag that doesn't belong to the user"
    );

    let res = app.call("GET", "/api/notes", Some(&alice), None).await;
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn test_names_unique_per_user() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    for (resource, message) in [
        ("folders", "The folder name already exists"),
        ("tags", "The tag name already exists"),
    ] {
        app.create(&alice, resource, json!({ "name": "Work" })).await;

        let res = app
            .call(
                "POST",
                &format!("/api/{}", resource),
                Some(&alice),
                Some(json!({ "name": "Work" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CONFLICT);
        assert_eq!(res.body["error"], message);

        app.create(&bob, resource, json!({ "name": "Work" })).await;

        let other = id_of(&app.create(&alice, resource, json!({ "name": "Home" })).await);
        let res = app
            .call(
                "PUT",
                &format!("/api/{}/{}", resource, other),
                Some(&alice),
                Some(json!({ "name": "Work" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CONFLICT);
    }
}

#[tokio::test]
async fn test_rename_and_sorted_listing() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    let b = id_of(&app.create(&token, "tags", json!({ "name": "b" })).await);
    app.create(&token, "tags", json!({ "name": "c" })).await;

    let res = app
        .call(
            "PUT",
            &format!("/api/tags/{}", b),
            Some(&token),
            Some(json!({ "name": "a" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "a");

    let res = app.call("GET", "/api/tags", Some(&token), None).await;
    let names: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "c"]);

    let res = app
        .call(
            "PUT",
            &format!("/api/tags/{}", b),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Missing `name` in request body");
}

#[tokio::test]
async fn test_tag_delete_pulls_tag_from_notes() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    let keep = id_of(&app.create(&token, "tags", json!({ "name": "keep" })).await);
    let drop = id_of(&app.create(&token, "tags", json!({ "name": "drop" })).await);
    let note = app
        .create(&token, "notes", json!({ "title": "tagged", "tags": [keep, drop] }))
        .await;
    assert_eq!(
        note["tags"],
        json!([{ "id": drop, "name": "drop" }, { "id": keep, "name": "keep" }])
    );

    let res = app
        .call("DELETE", &format!("/api/tags/{}", drop), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app
        .call("GET", &format!("/api/notes/{}", id_of(&note)), Some(&token), None)
        .await;
    assert_eq!(res.body["tags"], json!([{ "id": keep, "name": "keep" }]));

    let res = app
        .call("GET", &format!("/api/notes?tagId={}", drop), Some(&token), None)
        .await;
    assert_eq!(res.body, json!([]));

    let res = app
        .call("DELETE", &format!("/api/tags/{}", drop), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_search_and_filters() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let work = id_of(&app.create(&alice, "folders", json!({ "name": "Work" })).await);
    let urgent = id_of(&app.create(&alice, "tags", json!({ "name": "urgent" })).await);

    app.create(
        &alice,
        "notes",
        json!({ "title": "Budget review", "folderId": work, "tags": [urgent] }),
    )
    .await;
    app.create(
        &alice,
        "notes",
        json!({ "title": "Lunch", "content": "discuss the BUDGET" }),
    )
    .await;
    app.create(&alice, "notes", json!({ "title": "Gym" })).await;
    app.create(&bob, "notes", json!({ "title": "bob's budget" })).await;

    let titles = |res: &TestResponse| -> Vec<String> {
        res.body
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap().to_string())
            .collect()
    };

    let res = app
        .call("GET", "/api/notes?searchTerm=budget", Some(&alice), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(titles(&res), vec!["Lunch", "Budget review"]);

    let res = app
        .call(
            "GET",
            &format!("/api/notes?searchTerm=budget&folderId={}", work),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(titles(&res), vec!["Budget review"]);

    let res = app
        .call(
            "GET",
            &format!("/api/notes?tagId={}", urgent),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(titles(&res), vec!["Budget review"]);

    let res = app
        .call(
            "GET",
            "/api/notes?searchTerm=&folderId=&tagId=",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(titles(&res).len(), 3);

    let res = app
        .call("GET", "/api/notes?searchTerm=.*", Some(&alice), None)
        .await;
    assert_eq!(res.body, json!([]));

    let res = app
        .call("GET", "/api/notes?folderId=not-an-id", Some(&alice), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "The `folderId` is not valid");
}

#[tokio::test]
async fn test_note_update_semantics() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    let folder = id_of(&app.create(&token, "folders", json!({ "name": "Work" })).await);
    let tag = id_of(&app.create(&token, "tags", json!({ "name": "t" })).await);
    let note = app
        .create(
            &token,
            "notes",
            json!({ "title": "v1", "content": "body", "folderId": folder, "tags": [tag] }),
        )
        .await;
    let id = id_of(&note);
    let uri = format!("/api/notes/{}", id);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    // Content absent: kept. Folder and tags absent: cleared.
    let res = app
        .call("PUT", &uri, Some(&token), Some(json!({ "id": id, "title": "v2" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], "v2");
    assert_eq!(res.body["content"], "body");
    assert!(res.body["folderId"].is_null());
    assert_eq!(res.body["tags"], json!([]));
    assert_eq!(res.body["createdAt"], note["createdAt"]);
    assert_ne!(res.body["updatedAt"], note["updatedAt"]);

    let res = app
        .call(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "title": "v3", "content": null })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["content"].is_null());

    let other_id = uuid::Uuid::now_v7().to_string();
    let res = app
        .call(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "id": other_id, "title": "v4" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["error"],
        format!(
            "Request path id ({}) and request body id ({}) must match",
            id, other_id
        )
    );

    let res = app
        .call("PUT", &uri, Some(&token), Some(json!({ "content": "no title" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Missing `title` in request body");
}

#[tokio::test]
async fn test_malformed_input() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    for resource in ["folders", "tags", "notes"] {
        let res = app
            .call("GET", &format!("/api/{}/12345", resource), Some(&token), None)
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "The `id` is not valid");
    }

    let res = app
        .call(
            "POST",
            "/api/notes",
            Some(&token),
            Some(json!({ "title": "x", "folderId": "nope" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "The `folderId` is not valid");

    let res = app
        .call(
            "POST",
            "/api/notes",
            Some(&token),
            Some(json!({ "title": "x", "tags": "nope" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "`tags` is not an array");

    let res = app
        .call("POST", "/api/notes", Some(&token), Some(json!({ "title": "" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Missing `title` in request body");

    let request = Request::builder()
        .method("POST")
        .uri("/api/folders")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_notes_listed_most_recent_first() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    let first = id_of(&app.create(&token, "notes", json!({ "title": "first" })).await);
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.create(&token, "notes", json!({ "title": "second" })).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    app.call(
        "PUT",
        &format!("/api/notes/{}", first),
        Some(&token),
        Some(json!({ "title": "first, edited" })),
    )
    .await;

    let res = app.call("GET", "/api/notes", Some(&token), None).await;
    let titles: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first, edited", "second"]);
}

#[tokio::test]
async fn test_note_delete() {
    let app = TestApp::new();
    let token = app.user("alice").await;
    let id = id_of(&app.create(&token, "notes", json!({ "title": "bye" })).await);
    let uri = format!("/api/notes/{}", id);

    let res = app.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.call("GET", &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.call("DELETE", &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_docs_and_unknown_routes() {
    let app = TestApp::new();

    let res = app.call("GET", "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["backend"], "memory");
    assert!(res.body["pool"].is_null());
    assert!(res.headers.contains_key("x-request-id"));

    let res = app.call("GET", "/openapi.yaml", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::CONTENT_TYPE], "application/yaml");

    let res = app.call("GET", "/api/nothing-here", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({ "error": "Not Found" }));
}

#[tokio::test]
async fn test_nul_characters_rejected_before_storage() {
    let app = TestApp::new();

    let res = app
        .call(
            "POST",
            "/api/users",
            None,
            Some(json!({ "username": "nul\0user", "password": "password123" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["location"], "username");
    assert_eq!(res.body["error"], "Cannot contain NUL characters");

    let token = app.user("alice").await;
    let cases = [
        ("/api/notes", json!({ "title": "t\0x" }), "`title` cannot contain NUL characters"),
        (
            "/api/notes",
            json!({ "title": "t", "content": "a\0b" }),
            "`content` cannot contain NUL characters",
        ),
        ("/api/folders", json!({ "name": "W\0rk" }), "`name` cannot contain NUL characters"),
        ("/api/tags", json!({ "name": "t\0g" }), "`name` cannot contain NUL characters"),
    ];
    for (uri, body, message) in cases {
        let res = app.call("POST", uri, Some(&token), Some(body)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(res.body["error"], message);
    }

    let res = app
        .call("GET", "/api/notes?searchTerm=a%00b", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "`searchTerm` cannot contain NUL characters");

    for resource in ["notes", "folders", "tags"] {
        let res = app
            .call("GET", &format!("/api/{}", resource), Some(&token), None)
            .await;
        assert_eq!(res.body, json!([]), "{}", resource);
    }
}

#[tokio::test]
async fn test_malformed_query_string_uses_json_errors() {
    let app = TestApp::new();
    let token = app.user("alice").await;
    let id = uuid::Uuid::now_v7();

    let res = app
        .call(
            "GET",
            &format!("/api/notes?tagId={}&tagId={}", id, id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_bearer_scheme_any_case() {
    let app = TestApp::new();
    let token = app.user("alice").await;

    for scheme in ["bearer", "BEARER"] {
        let request = Request::builder()
            .method("GET")
            .uri("/api/notes")
            .header(header::AUTHORIZATION, format!("{} {}", scheme, token))
            .body(Body::empty())
            .unwrap();
        let res = app.send(request).await;
        assert_eq!(res.status, StatusCode::OK, "{}", scheme);
    }

    let request = Request::builder()
        .method("GET")
        .uri("/api/notes")
        .header(header::AUTHORIZATION, format!("Basic {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_refused_for_unknown_account() {
    let app = TestApp::new();
    let ghost = PublicUser {
        id: uuid::Uuid::now_v7(),
        username: "ghost".to_string(),
        fullname: None,
    };
    let token = TokenService::new("test-secret", "noteful", 1)
        .create_token(&ghost)
        .unwrap();

    // Signature is valid, so ordinary reads succeed.
    let res = app.call("GET", "/api/notes", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .call("POST", "/api/auth-tokens/refresh", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "Unauthorized");
}
