//! Integration tests for the tag automation endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use shop_console_core::tagging::OUTPUT_FILE_NAME;
use shop_console_integration_tests::{Part, console, post_multipart, send, zip_of};

const MASTER: &str = "\
Handle,Title,Tags,Vendor
mug-01,Mug,featured,Acme
mug-01,,,Acme
shirt-01,Shirt,,Acme
hat-01,Hat,summer,Acme
";

#[tokio::test]
async fn test_tags_are_merged_into_master() {
    let archive = zip_of(&[
        ("new-arrivals.csv", "Handle,Title\nmug-01,Mug\nshirt-01,Shirt\n"),
        ("Summer-Sale.csv", "handle\nshirt-01\n"),
        ("__MACOSX/._Summer-Sale.csv", "\u{0}\u{5}junk"),
        ("notes.txt", "ignore me"),
    ]);

    let response = send(
        console(),
        post_multipart(
            "/tag-automation",
            &[
                Part::File("master", "products_export.csv", MASTER.as_bytes()),
                Part::File("archive", "collections.zip", &archive),
            ],
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-updated-rows"], "2");
    assert!(response.headers.contains_key("x-run-id"));
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{OUTPUT_FILE_NAME}\"").as_str()
    );
    assert_eq!(
        response.text(),
        "\
Handle,Title,Tags,Vendor
mug-01,Mug,\"featured, cus-new-arrivals\",Acme
mug-01,,,Acme
shirt-01,Shirt,\"cus-new-arrivals, cus-Summer-Sale\",Acme
hat-01,Hat,summer,Acme
"
    );
}

#[tokio::test]
async fn test_custom_prefix_and_all_rows() {
    let archive = zip_of(&[("sale.csv", "Handle\nmug-01\n")]);

    let response = send(
        console(),
        post_multipart(
            "/tag-automation",
            &[
                Part::File("master", "products_export.csv", MASTER.as_bytes()),
                Part::File("archive", "collections.zip", &archive),
                Part::Text("prefix", "col-"),
                Part::Text("tag_all_rows", "true"),
            ],
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-updated-rows"], "2");
    let text = response.text();
    assert!(text.contains("mug-01,Mug,\"featured, col-sale\",Acme"));
    assert!(text.contains("mug-01,,col-sale,Acme"));
}

#[tokio::test]
async fn test_rerun_on_output_is_idempotent() {
    let archive = zip_of(&[("a.csv", "Handle\nshirt-01\n"), ("b.csv", "Handle\nshirt-01\n")]);
    let run = |master: Vec<u8>| {
        let archive = archive.clone();
        async move {
            send(
                console(),
                post_multipart(
                    "/tag-automation",
                    &[
                        Part::File("master", "m.csv", &master),
                        Part::File("archive", "c.zip", &archive),
                    ],
                ),
            )
            .await
        }
    };

    let first = run(b"Handle,Title,Tags\nshirt-01,Shirt,\n".to_vec()).await;
    assert_eq!(first.text(), "Handle,Title,Tags\nshirt-01,Shirt,\"cus-a, cus-b\"\n");

    let second = run(first.body.to_vec()).await;
    assert_eq!(second.headers["x-updated-rows"], "0");
    assert_eq!(second.text(), first.text());
}

#[tokio::test]
async fn test_short_master_rows_keep_every_column() {
    let master = "Handle,Title,Body,Tags,Vendor\nmug-01,Mug\nmug-02,Mug 2,<p>x</p>,,Acme\n";
    let archive = zip_of(&[("sale.csv", "Handle\nmug-01\n")]);

    let response = send(
        console(),
        post_multipart(
            "/tag-automation",
            &[
                Part::File("master", "products_export.csv", master.as_bytes()),
                Part::File("archive", "collections.zip", &archive),
            ],
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.text(),
        "Handle,Title,Body,Tags,Vendor\nmug-01,Mug,,cus-sale,\nmug-02,Mug 2,<p>x</p>,,Acme\n"
    );
}

#[tokio::test]
async fn test_missing_archive_is_bad_request() {
    let response = send(
        console(),
        post_multipart(
            "/tag-automation",
            &[Part::File("master", "products_export.csv", MASTER.as_bytes())],
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["phase"], "failed");
    assert_eq!(body["error"], "Missing input: collections ZIP");
}

#[tokio::test]
async fn test_corrupt_archive_is_unprocessable() {
    let response = send(
        console(),
        post_multipart(
            "/tag-automation",
            &[
                Part::File("master", "products_export.csv", MASTER.as_bytes()),
                Part::File("archive", "collections.zip", b"definitely not a zip"),
            ],
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json();
    assert_eq!(body["phase"], "failed");
    let log: Vec<&str> = body["log"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line.as_str().unwrap())
        .collect();
    assert_eq!(log[0], "Starting automation process...");
    assert!(log.contains(&"Loaded 4 rows from Master CSV."));
    assert!(log.last().unwrap().starts_with("ERROR: "));
}
