use super::*;
use bytes::Bytes;

fn source(chunks: Vec<Vec<u8>>) -> ByteStream {
    Box::pin(futures::stream::iter(
        chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))),
    ))
}

fn text_source(chunks: &[&str]) -> ByteStream {
    source(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
}

fn delta_line(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"delta": {"content": content}, "finish_reason": null}]})
    )
}

async fn collect_contents(decoder: SseDecoder) -> Vec<String> {
    decoder
        .into_stream()
        .map(|item| item.unwrap().content().unwrap_or_default().to_string())
        .collect()
        .await
}

#[test]
fn test_decode_line_classification() {
    assert_eq!(decode_line(""), Ok(SseLine::Skip));
    assert_eq!(decode_line(": keep-alive"), Ok(SseLine::Skip));
    assert_eq!(decode_line("event: message"), Ok(SseLine::Skip));
    assert_eq!(decode_line("data: [DONE]"), Ok(SseLine::Done));
    assert_eq!(decode_line("data: [DONE]\r"), Ok(SseLine::Done));

    match decode_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#) {
        Ok(SseLine::Event(event)) => assert_eq!(event.content(), Some("Hi")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_decode_line_malformed() {
    let err = decode_line("data: {not json").unwrap_err();
    assert_eq!(err.payload, "{not json");
    assert!(!err.reason.is_empty());
}

#[tokio::test]
async fn test_events_in_order() {
    let body = [delta_line("Hello"), delta_line(", "), delta_line("world"), "data: [DONE]\n\n".into()]
        .concat();
    let decoder = SseDecoder::new(text_source(&[&body]));
    assert_eq!(collect_contents(decoder).await, vec!["Hello", ", ", "world"]);
}

#[tokio::test]
async fn test_line_split_across_chunks() {
    let line = delta_line("split");
    let (a, b) = line.split_at(17);
    let decoder = SseDecoder::new(text_source(&[a, b, "data: [DONE]\n"]));
    assert_eq!(collect_contents(decoder).await, vec!["split"]);
}

#[tokio::test]
async fn test_multibyte_character_split_across_chunks() {
    let line = delta_line("caf\u{e9} \u{1f600}").into_bytes();
    let emoji_start = line.windows(4).position(|w| w == "\u{1f600}".as_bytes()).unwrap();
    let cut = emoji_start + 2;
    let chunks = vec![line[..cut].to_vec(), line[cut..].to_vec()];

    let decoder = SseDecoder::new(source(chunks));
    assert_eq!(collect_contents(decoder).await, vec!["caf\u{e9} \u{1f600}"]);
}

#[tokio::test]
async fn test_crlf_line_endings() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\ndata: [DONE]\r\n";
    let decoder = SseDecoder::new(text_source(&[body]));
    assert_eq!(collect_contents(decoder).await, vec!["a"]);
}

#[tokio::test]
async fn test_done_stops_reading() {
    let body = [delta_line("one"), "data: [DONE]\n".into(), delta_line("never")].concat();
    let decoder = SseDecoder::new(text_source(&[&body]));
    assert_eq!(collect_contents(decoder).await, vec!["one"]);
}

#[tokio::test]
async fn test_malformed_line_is_skipped() {
    let body = [delta_line("a"), "data: {oops\n".into(), delta_line("b"), "data: [DONE]\n".into()]
        .concat();
    let mut decoder = SseDecoder::new(text_source(&[&body]));

    assert_eq!(decoder.next_event().await.unwrap().unwrap().content(), Some("a"));
    assert_eq!(decoder.next_event().await.unwrap().unwrap().content(), Some("b"));
    assert!(decoder.next_event().await.is_none());
    assert_eq!(decoder.malformed_count(), 1);
}

#[tokio::test]
async fn test_comment_and_event_lines_are_ignored() {
    let body = [": OPENROUTER PROCESSING\n\n".to_string(), "event: ping\n".into(), delta_line("x")]
        .concat();
    let decoder = SseDecoder::new(text_source(&[&body]));
    assert_eq!(collect_contents(decoder).await, vec!["x"]);
}

#[tokio::test]
async fn test_trailing_line_without_newline_is_processed() {
    let line = delta_line("tail");
    let unterminated = line.trim_end_matches('\n');
    let decoder = SseDecoder::new(text_source(&[unterminated]));
    assert_eq!(collect_contents(decoder).await, vec!["tail"]);
}

#[tokio::test]
async fn test_end_of_body_without_done() {
    let decoder = SseDecoder::new(text_source(&[&delta_line("only")]));
    assert_eq!(collect_contents(decoder).await, vec!["only"]);
}

#[tokio::test]
async fn test_transport_error_ends_stream() {
    let items: Vec<Result<Bytes, TransportError>> = vec![
        Ok(Bytes::from(delta_line("before"))),
        Err(TransportError::network("connection reset")),
        Ok(Bytes::from(delta_line("after"))),
    ];
    let mut decoder = SseDecoder::new(Box::pin(futures::stream::iter(items)));

    assert_eq!(decoder.next_event().await.unwrap().unwrap().content(), Some("before"));
    assert_eq!(
        decoder.next_event().await.unwrap(),
        Err(TransportError::network("connection reset"))
    );
    assert!(decoder.next_event().await.is_none());
}

#[tokio::test]
async fn test_oversized_line_is_dropped() {
    let mut huge = b"data: ".to_vec();
    huge.extend(std::iter::repeat(b'x').take(MAX_LINE_BYTES + 10));
    let chunks = vec![
        huge[..MAX_LINE_BYTES / 2].to_vec(),
        huge[MAX_LINE_BYTES / 2..].to_vec(),
        b"\n".to_vec(),
        delta_line("after").into_bytes(),
    ];

    let mut decoder = SseDecoder::new(source(chunks));
    assert_eq!(decoder.next_event().await.unwrap().unwrap().content(), Some("after"));
    assert!(decoder.next_event().await.is_none());
    assert_eq!(decoder.malformed_count(), 0);
}

#[tokio::test]
async fn test_one_byte_chunks() {
    let body = [delta_line("drip"), "data: [DONE]\n".into()].concat();
    let chunks = body.bytes().map(|b| vec![b]).collect();
    let decoder = SseDecoder::new(source(chunks));
    assert_eq!(collect_contents(decoder).await, vec!["drip"]);
}
