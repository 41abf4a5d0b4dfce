use std::{path::Path, sync::Arc};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use httpmock::{Method::POST, Mock, MockServer};
use serde_json::{Value, json};
use tdssolver::{
    answer::{AnswerGenerator, AnswerSettings},
    api::create_router,
    oracle::OpenAiCompletionClient,
    service::SolverService,
};
use tower::ServiceExt;

const BOUNDARY: &str = "tds-integration-boundary";

struct Harness {
    server: MockServer,
    upload_dir: tempfile::TempDir,
    app: Router,
}

impl Harness {
    async fn new() -> Self {
        let server = MockServer::start_async().await;
        let upload_dir = tempfile::tempdir().expect("upload dir");
        let client =
            OpenAiCompletionClient::new(server.base_url(), "sk-test", None).expect("client");
        let generator = AnswerGenerator::new(Arc::new(client), AnswerSettings::default());
        let service = SolverService::new(generator, Some(upload_dir.path().to_path_buf()));
        Self {
            app: create_router(Arc::new(service)),
            server,
            upload_dir,
        }
    }

    async fn oracle_reply(&self, must_contain: &str, reply: &str) -> Mock<'_> {
        let must_contain = must_contain.to_string();
        let reply = reply.to_string();
        self.server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .body_contains(must_contain.as_str());
                then.status(200).json_body(json!({
                    "choices": [{ "message": { "role": "assistant", "content": reply } }]
                }));
            })
            .await
    }

    async fn post(&self, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(multipart_request(parts))
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn staged_files_left(&self) -> usize {
        count_entries(self.upload_dir.path())
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
            Part::File(file_name, contents) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(contents);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read dir").count()
}

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::{ZipWriter, write::SimpleFileOptions};

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

#[tokio::test]
async fn answer_column_shortcut_never_calls_the_oracle() {
    let harness = Harness::new().await;
    let mock = harness.oracle_reply("Question", "should not be used").await;

    let (status, body) = harness
        .post(&[
            Part::Text("question", "What is the value in the answer column of extract.csv?"),
            Part::File("extract.csv", b"X,answer\n3,42\n"),
        ])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "42" }));
    mock.assert_hits_async(0).await;
    assert_eq!(harness.staged_files_left(), 0);
}

#[tokio::test]
async fn other_csv_questions_forward_a_table_summary() {
    let harness = Harness::new().await;
    let mock = harness
        .oracle_reply("Shape: (2, 2)", "  the average is 4 \n")
        .await;

    let (status, body) = harness
        .post(&[
            Part::Text("question", "What is the average of column X?"),
            Part::File("extract.csv", b"X,answer\n3,42\n5,7\n"),
        ])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "the average is 4");
    mock.assert_hits_async(1).await;
    assert_eq!(harness.staged_files_left(), 0);
}

#[tokio::test]
async fn question_without_file_sends_only_the_question() {
    let harness = Harness::new().await;
    let mock = harness
        .oracle_reply("Question: Who maintains pandas?", "NumFOCUS")
        .await;

    let (status, body) = harness
        .post(&[Part::Text("question", "Who maintains pandas?")])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "NumFOCUS");
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn zipped_csv_is_unpacked_and_summarized() {
    let harness = Harness::new().await;
    let mock = harness.oracle_reply("Columns: city, answer", "Paris").await;
    let archive = zip_with(&[("notes.md", "ignored"), ("inner/extract.csv", "city,answer\nParis,1\n")]);

    let (status, body) = harness
        .post(&[
            Part::Text("question", "Which city is listed?"),
            Part::File("bundle.zip", &archive),
        ])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Paris");
    mock.assert_hits_async(1).await;
    assert_eq!(harness.staged_files_left(), 0);
}

#[tokio::test]
async fn text_upload_is_forwarded_in_full() {
    let harness = Harness::new().await;
    let mock = harness
        .oracle_reply("File content:\\nfirst line\\nsecond line", "2")
        .await;

    let (status, body) = harness
        .post(&[
            Part::Text("question", "How many lines?"),
            Part::File("notes.txt", b"first line\nsecond line"),
        ])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "2");
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn corrupt_upload_is_reported_and_cleaned_up() {
    let harness = Harness::new().await;
    let mock = harness.oracle_reply("Question", "unused").await;

    let (status, body) = harness
        .post(&[
            Part::Text("question", "Read the csv"),
            Part::File("broken.zip", b"this is not an archive"),
        ])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("message").contains("ZIP"));
    mock.assert_hits_async(0).await;
    assert_eq!(harness.staged_files_left(), 0);
}

#[tokio::test]
async fn oracle_outage_is_a_bad_gateway() {
    let harness = Harness::new().await;
    harness
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("upstream overloaded");
        })
        .await;

    let (status, body) = harness
        .post(&[Part::Text("question", "Anything?")])
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().expect("message");
    assert!(message.contains("503"));
    assert!(!message.contains("upstream overloaded"));
}
