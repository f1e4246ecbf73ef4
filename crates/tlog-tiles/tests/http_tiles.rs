//! HTTP fetcher status handling against a local server

use tlog_tiles::{Error, HttpTiles, TileFetcher, TileId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned response per connection, whatever the request
async fn serve(status: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                status,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(body).await;
            let _ = stream.shutdown().await;
        }
    });
    format!("http://{}/log", addr)
}

#[tokio::test]
async fn test_success_returns_body() {
    let base = serve("200 OK", b"example.com/log\n").await;
    let tiles = HttpTiles::new(&base).unwrap();
    assert_eq!(tiles.read_checkpoint().await.unwrap(), b"example.com/log\n");
}

#[tokio::test]
async fn test_missing_tile_is_not_found() {
    let base = serve("404 Not Found", b"").await;
    let tiles = HttpTiles::new(&base).unwrap();
    let tile = TileId {
        level: 0,
        index: 1,
        width: 44,
    };
    let err = tiles.read_tile(tile).await.unwrap_err();
    match err {
        Error::NotFound(url) => assert!(url.ends_with("/log/tile/0/001.p/44")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_http() {
    let base = serve("500 Internal Server Error", b"down").await;
    let tiles = HttpTiles::new(&base).unwrap();
    let err = tiles.read_checkpoint().await.unwrap_err();
    match err {
        Error::Http(message) => assert!(message.contains("500")),
        other => panic!("expected Http, got {other:?}"),
    }
}
