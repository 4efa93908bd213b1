//! Basic ingest / retrieve round-trips.

use crate::error::{EngineError, ErrorKind};

use super::helpers::{file_node, memory_node, test_data};

#[tokio::test]
async fn test_roundtrip_sizes_around_block_boundaries() {
    let node = memory_node(64);
    for size in [0usize, 1, 63, 64, 65, 128, 224, 1000] {
        let data = test_data(size);
        let name = format!("file-{size}.bin");

        let receipt = node.ingest(&name, &data[..]).await.unwrap();
        assert_eq!(receipt.blocks, size.div_ceil(64), "block count for {size}");
        assert_eq!(receipt.bytes, size as u64);

        let got = node.retrieve(&name).await.unwrap();
        assert_eq!(got, data, "round-trip mismatch for {size} bytes");
    }
}

#[tokio::test]
async fn test_roundtrip_on_disk() {
    let (node, dir) = file_node(1024);
    let data = test_data(10_000);

    let receipt = node.ingest("report.pdf", &data[..]).await.unwrap();
    assert_eq!(receipt.blocks, 10);
    assert_eq!(node.retrieve("report.pdf").await.unwrap(), data);

    // Manifest on disk: one hex key per line, in block order.
    let manifest =
        std::fs::read_to_string(dir.path().join("manifests").join("report.pdf.txt")).unwrap();
    assert_eq!(manifest.lines().count(), 10);
    for line in manifest.lines() {
        assert_eq!(line.len(), 64);
        assert!(dir.path().join("blocks").join(line).exists());
    }
}

#[tokio::test]
async fn test_reopened_node_reads_existing_data() {
    let (node, dir) = file_node(512);
    let data = test_data(3000);
    node.ingest("keep.bin", &data[..]).await.unwrap();
    drop(node);

    let config = crate::TesseraNodeConfig { block_size: 512 };
    let reopened = crate::TesseraNode::open(config, dir.path()).unwrap();
    assert_eq!(reopened.retrieve("keep.bin").await.unwrap(), data);
    // The keyword index is not persisted.
    assert_eq!(reopened.index().len(), 0);
}

#[tokio::test]
async fn test_empty_file_roundtrip() {
    let node = memory_node(1024);
    let receipt = node.ingest("empty.txt", &b""[..]).await.unwrap();
    assert_eq!(receipt.blocks, 0);
    assert!(node.retrieve("empty.txt").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overwrite_replaces_manifest() {
    let node = memory_node(128);
    let first = test_data(1000);
    let second = b"entirely different, much shorter".to_vec();

    node.ingest("doc.txt", &first[..]).await.unwrap();
    node.ingest("doc.txt", &second[..]).await.unwrap();

    assert_eq!(node.retrieve("doc.txt").await.unwrap(), second);
    assert_eq!(node.list_files().await.unwrap(), vec!["doc.txt"]);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let node = memory_node(1024);
    let err = node.retrieve("nope.txt").await.unwrap_err();
    assert!(
        matches!(err, EngineError::NotFound { ref filename } if filename == "nope.txt"),
        "unexpected error: {err}"
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_retrieve_to_streams_in_order() {
    let node = memory_node(16);
    let data = test_data(100);
    node.ingest("s.bin", &data[..]).await.unwrap();

    let mut sink = Vec::new();
    let written = node.retrieve_to("s.bin", &mut sink).await.unwrap();
    assert_eq!(written, 100);
    assert_eq!(sink, data);
}

#[tokio::test]
async fn test_unsafe_filenames_rejected() {
    let (node, dir) = file_node(1024);
    for name in ["", "../escape.txt", "dir/file", ".."] {
        let err = node.ingest(name, &b"payload"[..]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadInput, "{name:?} should be rejected");

        let err = node.retrieve(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadInput);
    }
    // Nothing was written for rejected names.
    assert!(node.store().list().await.unwrap().is_empty());
    assert!(!dir.path().join("escape.txt.txt").exists());
}

#[tokio::test]
async fn test_stats() {
    let node = memory_node(8);
    node.ingest("a", &b"alpha beta gamma"[..]).await.unwrap();

    let stats = node.stats().await.unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.blocks, 2);
    assert!(stats.keywords > 0);
}
