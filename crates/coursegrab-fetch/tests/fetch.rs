use coursegrab_core::{ResourceKind, ResourceLink, ResourceMap};
use coursegrab_fetch::{Error, FetchConfig, Fetcher};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 server answering by request path
async fn spawn_stub() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buffer = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                    let read = socket.read(&mut chunk).await.unwrap();
                    if read == 0 {
                        return;
                    }
                    buffer.extend_from_slice(&chunk[..read]);
                }
                let request = String::from_utf8_lossy(&buffer);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                if path == "/stall" {
                    // Headers and half the body, then nothing
                    let head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial";
                    socket.write_all(head.as_bytes()).await.unwrap();
                    std::future::pending::<()>().await;
                }

                let response = match path.as_str() {
                    "/named" => http_response(
                        "200 OK",
                        Some(r#"attachment; filename="week1_lecture1.txt""#),
                        "transcript one",
                    ),
                    "/plain" => http_response("200 OK", None, "transcript two"),
                    _ => http_response("404 Not Found", None, "missing"),
                };
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            });
        }
    });

    addr
}

fn http_response(status: &str, disposition: Option<&str>, body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    if let Some(value) = disposition {
        response.push_str(&format!("Content-Disposition: {}\r\n", value));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

fn transcript(key: &str, url: String) -> ResourceLink {
    ResourceLink {
        key: key.to_string(),
        url,
        kind: ResourceKind::Transcript,
    }
}

#[tokio::test]
async fn test_transcripts_are_named_from_headers_or_key() {
    let addr = spawn_stub().await;
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    map.insert(transcript("abc", format!("http://{}/named", addr)));
    map.insert(transcript("def", format!("http://{}/plain", addr)));

    let config = FetchConfig::new(temp_dir.path()).with_pause(Duration::ZERO);
    let report = Fetcher::new(config).unwrap().fetch_all(&map).await;

    assert!(report.is_complete(), "failures: {:?}", report.failed);
    let transcripts = temp_dir.path().join("transcripts");
    assert_eq!(
        report.downloaded,
        vec![transcripts.join("week1_lecture1.txt"), transcripts.join("def.txt")]
    );
    assert_eq!(
        std::fs::read_to_string(transcripts.join("week1_lecture1.txt")).unwrap(),
        "transcript one"
    );
    assert_eq!(
        std::fs::read_to_string(transcripts.join("def.txt")).unwrap(),
        "transcript two"
    );
}

#[tokio::test]
async fn test_failed_item_does_not_stop_the_run() {
    let addr = spawn_stub().await;
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    map.insert(transcript("gone", format!("http://{}/missing", addr)));
    map.insert(transcript("def", format!("http://{}/plain", addr)));

    let config = FetchConfig::new(temp_dir.path()).with_pause(Duration::ZERO);
    let report = Fetcher::new(config).unwrap().fetch_all(&map).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, "gone");
    assert!(report.failed[0].reason.contains("404"));
    assert_eq!(report.downloaded.len(), 1);
    assert!(temp_dir.path().join("transcripts/def.txt").exists());
}

#[tokio::test]
async fn test_lectures_fail_without_ytdlp() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    for key in ["lec01.mp4", "lec02.mp4"] {
        map.insert(ResourceLink {
            key: key.to_string(),
            url: format!("https://media.example.com/videos/{}", key),
            kind: ResourceKind::Lecture,
        });
    }

    let config = FetchConfig::new(temp_dir.path())
        .with_pause(Duration::ZERO)
        .with_ytdlp_binary("/nonexistent/yt-dlp");
    let report = Fetcher::new(config).unwrap().fetch_all(&map).await;

    assert!(report.downloaded.is_empty());
    let keys: Vec<_> = report.failed.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, ["lec01.mp4", "lec02.mp4"]);
    assert!(report.failed[0].reason.contains("not found"));
}

#[tokio::test(start_paused = true)]
async fn test_items_are_separated_by_the_pause() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    for key in ["a.mp4", "b.mp4", "c.mp4"] {
        map.insert(ResourceLink {
            key: key.to_string(),
            url: format!("https://media.example.com/videos/{}", key),
            kind: ResourceKind::Lecture,
        });
    }

    let config = FetchConfig::new(temp_dir.path()).with_ytdlp_binary("/nonexistent/yt-dlp");
    let start = tokio::time::Instant::now();
    let report = Fetcher::new(config).unwrap().fetch_all(&map).await;

    assert_eq!(report.failed.len(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancel_stops_a_stalled_transfer() {
    let addr = spawn_stub().await;
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    map.insert(transcript("def", format!("http://{}/plain", addr)));
    map.insert(transcript("slow", format!("http://{}/stall", addr)));
    map.insert(transcript("never", format!("http://{}/named", addr)));

    let config = FetchConfig::new(temp_dir.path()).with_pause(Duration::ZERO);
    let fetcher = Fetcher::new(config).unwrap();
    let cancel = tokio::time::sleep(Duration::from_millis(300));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        fetcher.fetch_all_until(&map, cancel),
    )
    .await
    .expect("cancellation did not stop the download");

    assert!(matches!(result, Err(Error::Cancelled { downloaded: 1 })));
    let mut files: Vec<_> = std::fs::read_dir(temp_dir.path().join("transcripts"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    files.sort();
    assert_eq!(files, ["def.txt"]);
}

#[tokio::test]
async fn test_uncancelled_run_returns_the_report() {
    let addr = spawn_stub().await;
    let temp_dir = tempfile::tempdir().unwrap();

    let mut map = ResourceMap::new();
    map.insert(transcript("def", format!("http://{}/plain", addr)));

    let config = FetchConfig::new(temp_dir.path()).with_pause(Duration::ZERO);
    let report = Fetcher::new(config)
        .unwrap()
        .fetch_all_until(&map, std::future::pending())
        .await
        .unwrap();

    assert_eq!(report.downloaded.len(), 1);
}
