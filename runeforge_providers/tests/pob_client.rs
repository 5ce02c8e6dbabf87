//! `PobClient` against a canned local HTTP responder.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use runeforge_core::{EnchantSource, ImpactEvaluator, RuneSource};
use runeforge_providers::PobClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Seen = Arc<Mutex<Vec<String>>>;

/// Answer one connection per canned response, recording each request's
/// request line and body.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::default();
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        for (code, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            log.lock().unwrap().push(request);
            let reply = format!(
                "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}"), seen)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length || n == 0 {
                let request_line = text.lines().next().unwrap_or_default().to_string();
                return format!("{request_line}\n{}", &text[end + 4..]);
            }
        }
        if n == 0 {
            return text;
        }
    }
}

fn client(base: &str) -> PobClient {
    PobClient::new(Duration::from_secs(5))
        .unwrap()
        .with_base_url(base)
        .with_retry_delays(vec![Duration::from_millis(5)])
}

#[tokio::test]
async fn runes_are_requested_by_bucket_key() {
    let (base, seen) = serve(vec![(200, r#"["+10% to Fire Resistance"]"#)]).await;
    let runes = client(&base).list_runes("armour,helmet").await.unwrap();

    assert_eq!(runes, ["+10% to Fire Resistance"]);
    let seen = seen.lock().unwrap();
    assert!(seen[0].starts_with("GET /runes?slot=armour%2Chelmet "));
}

#[tokio::test]
async fn catalog_get_is_retried() {
    let (base, seen) = serve(vec![
        (500, r#"{"detail":"warming up"}"#),
        (200, r#"{"boots":["b"],"armour":["a"]}"#),
    ])
    .await;
    let runes = client(&base).list_runes("armour,boots").await.unwrap();

    assert_eq!(runes, ["a", "b"]);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn enchant_search_sends_query_and_limit() {
    let (base, seen) = serve(vec![(
        200,
        r#"[{"id":"enchant.stat_1","text":"Allocates Inspiration"}]"#,
    )])
    .await;
    let entries = client(&base)
        .with_enchant_limit(10)
        .search_enchants(" insp ")
        .await
        .unwrap();

    assert_eq!(entries[0].id, "enchant.stat_1");
    assert!(seen.lock().unwrap()[0].starts_with("GET /amulet-enchants?q=insp&limit=10 "));
}

#[tokio::test]
async fn impact_posts_item_text() {
    let (base, seen) = serve(vec![(200, r#"{"html":"<b>+3.2% DPS</b>"}"#)]).await;
    let html = client(&base)
        .evaluate_impact("Rarity: Rare\nIron Cap")
        .await
        .unwrap();

    assert_eq!(html, "<b>+3.2% DPS</b>");
    let seen = seen.lock().unwrap();
    assert!(seen[0].starts_with("POST /item-impact "));
    assert!(seen[0].contains(r#"{"item":"Rarity: Rare\nIron Cap"}"#));
}

#[tokio::test]
async fn error_status_carries_the_body() {
    let (base, _) = serve(vec![(
        422,
        r#"{"detail":"PoB returned no output for this item"}"#,
    )])
    .await;
    let err = client(&base).evaluate_impact("Iron Cap").await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("422"));
    assert!(message.contains("PoB returned no output"));
}

#[tokio::test]
async fn status_and_load_build() {
    let (base, seen) = serve(vec![
        (200, r#"{"running":true,"import_error":null}"#),
        (200, r#"{"status":"ok"}"#),
    ])
    .await;
    let client = client(&base);

    let status = client.status().await.unwrap();
    assert!(status.running);
    assert_eq!(status.import_error, None);

    client.load_build(Some(" /builds/witch.xml ")).await.unwrap();
    let seen = seen.lock().unwrap();
    assert!(seen[1].starts_with("POST /load_pob "));
    assert!(seen[1].contains(r#"{"path":"/builds/witch.xml"}"#));
}
