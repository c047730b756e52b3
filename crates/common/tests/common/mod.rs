//! Shared fixtures for the form sink integration tests
#![allow(dead_code)]

use std::path::PathBuf;

use bytes::Bytes;
use common::prelude::*;

pub const HOST: &str = "formsink.test";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn tiny_ppm() -> Bytes {
    Bytes::from(std::fs::read(fixture("tiny.ppm")).unwrap())
}

/// The contact form as declared in `fixtures/contact.html`.
pub fn contact_spec() -> FormSpec {
    FormSpec::new("contact")
        .with_fields(["name", "email", "message"])
        .with_files(["picture"])
}

/// The submission a browser sends for the contact form.
pub fn contact_submission() -> Submission {
    let mut submission = Submission::new();
    submission.add_value("name", "crasm");
    submission.add_value("email", "crasm@formsink.email.vczf.io");
    submission.add_value("message", "I ♥ formsink!");
    submission.add_file(
        "picture",
        UploadedFile::in_memory(
            "tiny.ppm",
            Some("image/x-portable-pixmap".to_string()),
            tiny_ppm(),
        ),
    );
    submission
}

pub fn translator() -> Translator {
    Translator::new(Identity::new(HOST).unwrap())
}
