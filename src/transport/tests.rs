use super::{FormRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one request on a loopback port and returns the raw
/// request text through the join handle.
async fn serve_once(
    status_line: &'static str,
    extra_headers: &'static str,
    body: &'static str,
) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&buf).to_string()
    });

    (port, handle)
}

#[test]
fn test_form_request_builder() {
    let req = FormRequest::put("PUTVAL")
        .field("valname", "x")
        .field("val", String::from("y"));
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.get("val"), Some("y"));
    assert_eq!(req.get("missing"), None);
    assert_eq!(req.method.as_str(), "PUT");
}

#[tokio::test]
async fn test_post_sends_form_body() {
    let (port, server) = serve_once("200 OK", "", "done").await;
    let transport = ReqwestTransport::new("127.0.0.1", port).unwrap();

    let resp = transport
        .send(FormRequest::post("POST").field("topic", "a b&c").field("from", "me"))
        .await
        .unwrap();

    assert_eq!(resp, HttpResponse::new(200, "done"));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /POST HTTP/1.1"));
    assert!(raw.to_lowercase().contains("content-type: application/x-www-form-urlencoded"));
    assert!(raw.ends_with("topic=a+b%26c&from=me"));
}

#[tokio::test]
async fn test_put_redirect_is_not_followed() {
    let (port, server) =
        serve_once("308 Permanent Redirect", "Location: /elsewhere\r\n", "").await;
    let transport = ReqwestTransport::new("127.0.0.1", port).unwrap();

    let resp = transport
        .send(FormRequest::put("PUTVAL").field("valname", "v"))
        .await
        .unwrap();

    assert_eq!(resp.status, 308);
    assert!(server.await.unwrap().starts_with("PUT /PUTVAL HTTP/1.1"));
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = ReqwestTransport::new("127.0.0.1", port).unwrap();
    let err = transport.send(FormRequest::post("PICKUP")).await.unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)));
}

#[test]
fn test_invalid_address_is_rejected() {
    let err = ReqwestTransport::new("not a host", 80).unwrap_err();
    assert!(matches!(err, TransportError::InvalidAddress(_)));
}

#[test]
fn test_base_url() {
    let transport = ReqwestTransport::new("192.168.1.79", 33334).unwrap();
    assert_eq!(transport.base_url(), "http://192.168.1.79:33334");
}
