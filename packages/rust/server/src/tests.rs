use std::path::PathBuf;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use steplab_core::Tutorial;
use steplab_shared::ContentLayout;
use tower::ServiceExt;
use uuid::Uuid;

use super::*;
use crate::handlers::ORIGIN_HEADER;

struct Course {
    root: PathBuf,
}

impl Course {
    fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!("steplab-http-{label}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    fn mkdir(&self, rel: &str) -> &Self {
        std::fs::create_dir_all(self.root.join(rel)).unwrap();
        self
    }

    fn app(&self) -> Router {
        let tutorial = Tutorial::new(ContentLayout::rooted_at(&self.root)).unwrap();
        let cache = CachePolicy {
            asset_max_age: 240,
            api_max_age: 120,
        };
        create_app(AppState::new(tutorial, cache))
    }
}

impl Drop for Course {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

async fn send(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_str<'a>(response: &'a Response, name: impl header::AsHeaderName) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn step_file_wins_over_shared_base() {
    let course = Course::new("precedence");
    course
        .write("lib/app/app.js", "base")
        .write("step1/app.js", "mine")
        .write("lib/app/util.js", "shared");

    let response = send(course.app(), "/step1/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, &ORIGIN_HEADER), "step-specific");
    assert_eq!(header_str(&response, header::CACHE_CONTROL), "public, max-age=240");
    assert_eq!(text(response).await, "mine");

    let response = send(course.app(), "/step1/util.js").await;
    assert_eq!(header_str(&response, &ORIGIN_HEADER), "shared-base");
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/javascript; charset=utf-8"
    );
    assert_eq!(text(response).await, "shared");
}

#[tokio::test]
async fn composable_asset_is_concatenated() {
    let course = Course::new("compose");
    course
        .write("lib/app/index.css", "body{}")
        .write("step2/index.css", "h1{}");

    let response = send(course.app(), "/step2/index.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, &ORIGIN_HEADER), "composed");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "14");
    assert!(header_str(&response, header::ETAG).starts_with('"'));
    assert_eq!(text(response).await, "body{}\n\nh1{}\n\n");
}

#[tokio::test]
async fn article_scoped_asset() {
    let course = Course::new("article");
    course
        .write("step1/app.js", "step")
        .write("step1/intro/app.js", "article");

    let response = send(course.app(), "/step1/intro/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "article");
}

#[tokio::test]
async fn unknown_step_and_missing_file_are_404() {
    let course = Course::new("missing");
    course.write("lib/app/app.js", "base").mkdir("step1");

    let app = course.app();
    assert_eq!(
        send(app.clone(), "/step9/app.js").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(app.clone(), "/step1/nope.js").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(app, "/stepx/app.js").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn info_falls_back_but_test_does_not() {
    let course = Course::new("content");
    course
        .write("step1/README.md", "# One")
        .write("lib/done.md", "# Done")
        .mkdir("step2");

    let app = course.app();
    let response = send(app.clone(), "/info/step1/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "# One");

    let response = send(app.clone(), "/info/step2/intro/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "# Done");

    let response = send(app.clone(), "/info/finale/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "# Done");

    assert_eq!(
        send(app, "/test/step2/").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn init_copies_then_reports_empty_previous() {
    let course = Course::new("init");
    course
        .write("step1/app.js", "one")
        .write("step1/README.md", "# One")
        .mkdir("step2")
        .mkdir("step3")
        .mkdir("step4");

    let app = course.app();
    let response = send(app.clone(), "/init/step2/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
    assert!(course.root.join("step2/app.js").exists());
    assert!(!course.root.join("step2/README.md").exists());

    assert_eq!(
        send(app.clone(), "/init/step4/").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(send(app, "/init/step1/").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn pages_and_manifest_link() {
    let course = Course::new("pages");
    course
        .write("lib/app/home.html", "<home>")
        .write("lib/app/article.html", "<article>")
        .write("step1/manifest.json", "{}");

    let app = course.app();
    let response = send(app.clone(), "/step1/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, header::LINK).contains("manifest"));
    assert_eq!(text(response).await, "<home>");

    let response = send(app, "/step1/1.20240101.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "<article>");
}

#[tokio::test]
async fn api_serves_json_with_short_cache() {
    let course = Course::new("api");
    course.write("lib/app/api/articles/index.json", "[1,2]");

    let response = send(course.app(), "/api/articles.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(course.app(), "/api/articles/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CACHE_CONTROL), "public, max-age=120");
    assert_eq!(text(response).await, "[1,2]");
}

#[tokio::test]
async fn extensionless_paths_redirect() {
    let course = Course::new("redirect");

    let response = send(course.app(), "/info/step1?x=1").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header_str(&response, header::LOCATION), "/info/step1/?x=1");
}

#[tokio::test]
async fn unmatched_routes_say_hello() {
    let course = Course::new("hello");

    let response = send(course.app(), "/a/b/c/d.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "\"hello\"");
}

#[tokio::test]
async fn index_lists_steps() {
    let course = Course::new("index");
    course.mkdir("step2").mkdir("step1").mkdir("lib");

    let response = send(course.app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(body["steps"], serde_json::json!(["step1", "step2"]));
}
