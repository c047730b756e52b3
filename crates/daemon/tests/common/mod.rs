//! Shared helpers for driving the sink router in-process
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use tower::ServiceExt;
use url::Url;

use ::common::form::forms_from_readers;
use ::common::prelude::*;
use formsink_daemon::http_server::{self, Config};
use formsink_daemon::service_state::load_catalog;
use formsink_daemon::{ServiceConfig, ServiceState};

pub const HOST: &str = "formsink.test";
pub const REDIRECT: &str = "https://ddg.gg/";

const BOUNDARY: &str = "------------------------formsinktestboundary";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Depositor that refuses everything.
#[derive(Debug, Default)]
pub struct FailingDepositor;

#[async_trait]
impl Depositor for FailingDepositor {
    async fn deposit(&self, _message: Message) -> Result<(), DepositError> {
        Err(DepositError::Rejected("disk full".to_string()))
    }
}

pub fn state(depositor: Arc<dyn Depositor>) -> ServiceState {
    let catalog = load_catalog(&[fixture("contact.html")]).unwrap();
    state_with(catalog, depositor)
}

fn state_with(catalog: Catalog, depositor: Arc<dyn Depositor>) -> ServiceState {
    let translator = Translator::new(Identity::new(HOST).unwrap());
    ServiceState::new(catalog, translator, depositor)
}

pub fn config(redirect: Option<&str>) -> Config {
    let service_config = ServiceConfig {
        redirect: redirect.map(|r| Url::parse(r).unwrap()),
        ..ServiceConfig::default()
    };
    Config::new(&service_config)
}

pub fn router(depositor: Arc<dyn Depositor>, redirect: Option<&str>) -> Router {
    http_server::router(config(redirect), state(depositor))
}

/// Router serving the forms of an inline HTML page.
pub fn router_for_page(
    html: &str,
    depositor: Arc<dyn Depositor>,
    redirect: Option<&str>,
) -> Router {
    let forms = forms_from_readers([html.as_bytes()]).unwrap();
    let catalog = Catalog::build(forms).unwrap();
    http_server::router(config(redirect), state_with(catalog, depositor))
}

/// One part of a hand-built `multipart/form-data` body.
pub enum Part<'a> {
    Value(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Value(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn post_multipart(path: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// The submission a browser sends for the contact page.
pub fn contact_parts() -> Vec<Part<'static>> {
    vec![
        Part::Value("name", "crasm"),
        Part::Value("email", "crasm@formsink.email.vczf.io"),
        Part::Value("message", "I ♥ formsink!"),
        Part::File(
            "picture",
            "tiny.ppm",
            "image/x-portable-pixmap",
            include_bytes!("../fixtures/tiny.ppm"),
        ),
    ]
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
