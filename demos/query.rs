//! Query demo - a reference server and a client in one process.
//!
//! This example demonstrates:
//! - Building a document store and serving it on a Unix socket
//! - Configuring a client with the builder pattern
//! - Running each kind of request, with and without a query
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=custard_client=debug cargo run --example query
//! ```

use std::time::Duration;

use custard_client::server::Server;
use custard_client::store::DocumentStore;
use custard_client::transport::generate_socket_path;
use custard_client::{Client, Document, Framing, Query};
use tracing_subscriber::EnvFilter;

fn sample_documents() -> DocumentStore {
    [
        Document::new(
            "about.md",
            "A small garden of notes.",
            "2024-01-01T09:00:00Z",
            "2024-02-01T09:00:00Z",
        ),
        Document::new(
            "chai-cheese.md",
            "Spiced tea meets aged cheddar.\nIt works.",
            "2024-01-03T18:30:00Z",
            "2024-01-03T18:30:00Z",
        )
        .with_field("title", "Chai and cheese")
        .with_field("tags", vec!["ramble", "travel"]),
        Document::new(
            "parser-notes.md",
            "Writing a msgpack skipper by hand.",
            "2024-01-05T11:00:00Z",
            "2024-01-06T08:15:00Z",
        )
        .with_field("title", "Parser notes")
        .with_field("tags", vec!["code", "sketch"]),
        Document::new(
            "synth-patch.md",
            "Two oscillators, one filter.",
            "2024-01-09T21:45:00Z",
            "2024-01-09T21:45:00Z",
        )
        .with_field("title", "Synth patch")
        .with_field("tags", vec!["music", "code"]),
    ]
    .into_iter()
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = generate_socket_path();
    let server = Server::builder(&path)
        .framing(Framing::LengthPrefixed)
        .bind(sample_documents())?
        .spawn();

    let client = Client::builder(&path)
        .timeout(Duration::from_secs(2))
        .build();

    let code = Query::builder().field("tags", ["code"]).build()?;

    let page = client.get_list("title", false, 0, Some(10)).await?;
    println!("ListGet:\n{}", serde_json::to_string_pretty(&page)?);

    let page = client.query_list(code.clone(), "", true, 0, None).await?;
    println!("ListQuery tags=code:\n{}", serde_json::to_string_pretty(&page)?);

    let single = client.get_single("chai-cheese.md", "title", false).await?;
    println!("SingleGet:\n{}", serde_json::to_string_pretty(&single)?);

    let single = client.query_single(code.clone(), "about.md", "", false).await?;
    println!("SingleQuery about.md in tags=code: {single:?}");

    println!("CollateGet tags: {:?}", client.get_collate("tags").await?);
    println!(
        "CollateQuery tags in tags=code: {:?}",
        client.query_collate(code, "tags").await?
    );

    server.abort();
    Ok(())
}
