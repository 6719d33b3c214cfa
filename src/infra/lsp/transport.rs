//! LSP Transport Layer
//!
//! Handles LSP message framing with Content-Length headers:
//! ```text
//! Content-Length: 123\r\n
//! \r\n
//! {"jsonrpc":"2.0",...}
//! ```
//! [`split`] finds complete frames in an accumulating buffer, [`decode`] and
//! [`encode`] convert single frames, and [`FrameReader`]/[`FrameWriter`] wrap
//! them around async streams.

use bytes::{Buf, BytesMut};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::protocol::Incoming;
use crate::error::FramingError;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
const CONTENT_LENGTH: &str = "Content-Length";

/// Headers longer than this without a terminator are treated as garbage.
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Declared body lengths above this are rejected before any buffering.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

const INITIAL_BUF_CAPACITY: usize = 8 * 1024;

/// Locate the end of the header block (index just past `\r\n\r\n`).
fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|i| i + HEADER_TERMINATOR.len())
}

/// Parse the header block and return the declared body length.
fn content_length(header: &[u8]) -> Result<usize, FramingError> {
    let header = std::str::from_utf8(header)
        .map_err(|_| FramingError::MalformedHeader("header is not valid UTF-8".into()))?;

    let mut length = None;
    for line in header.split("\r\n").filter(|l| !l.is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            return Err(FramingError::MalformedHeader(format!(
                "header line without colon: {:?}",
                line
            )));
        };
        // Other headers (Content-Type) are accepted and ignored
        if key.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
            let parsed = value.trim().parse::<usize>().map_err(|e| {
                FramingError::MalformedHeader(format!("invalid Content-Length {:?}: {}", value, e))
            })?;
            if parsed > MAX_BODY_BYTES {
                return Err(FramingError::MalformedHeader(format!(
                    "Content-Length {} exceeds {} bytes",
                    parsed, MAX_BODY_BYTES
                )));
            }
            length = Some(parsed);
        }
    }

    length.ok_or_else(|| FramingError::MalformedHeader("missing Content-Length".into()))
}

/// Total frame size: header plus declared body.
fn frame_len(header_len: usize, body_len: usize) -> Result<usize, FramingError> {
    header_len
        .checked_add(body_len)
        .ok_or_else(|| FramingError::MalformedHeader("Content-Length overflows".into()))
}

/// Stream splitter: return the byte length of the next complete frame in
/// `buf`, or `Ok(None)` while header or body is still incomplete.
///
/// Never consumes input; callers advance their buffer by the returned length.
pub fn split(buf: &[u8]) -> Result<Option<usize>, FramingError> {
    let Some(end) = header_end(buf) else {
        if buf.len() > MAX_HEADER_BYTES {
            return Err(FramingError::MalformedHeader(format!(
                "no header terminator within {} bytes",
                MAX_HEADER_BYTES
            )));
        }
        return Ok(None);
    };

    let body_len = content_length(&buf[..end])?;
    let total = frame_len(end, body_len)?;
    if buf.len() < total {
        return Ok(None);
    }
    Ok(Some(total))
}

/// Decode one complete frame (header + body) into its envelope.
pub fn decode(frame: &[u8]) -> Result<Incoming, FramingError> {
    let end = header_end(frame)
        .ok_or_else(|| FramingError::MalformedHeader("missing header terminator".into()))?;
    let body_len = content_length(&frame[..end])?;
    let total = frame_len(end, body_len)?;

    let body = frame.get(end..total).ok_or_else(|| {
        FramingError::MalformedBody(format!(
            "expected {} body bytes, found {}",
            body_len,
            frame.len() - end
        ))
    })?;

    Incoming::from_body(body).map_err(|e| FramingError::MalformedBody(e.to_string()))
}

/// Encode a message with a Content-Length computed from its serialized body.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, FramingError> {
    let json =
        serde_json::to_string(message).map_err(|e| FramingError::MalformedBody(e.to_string()))?;

    let mut framed = format!("{}: {}\r\n\r\n", CONTENT_LENGTH, json.len()).into_bytes();
    framed.extend_from_slice(json.as_bytes());
    Ok(framed)
}

/// Reads framed messages off an arbitrarily chunked byte stream.
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUF_CAPACITY),
        }
    }

    /// Read the next raw frame. Returns `Ok(None)` on clean EOF.
    ///
    /// A malformed header is reported once and its bytes are discarded, so
    /// the caller can keep reading.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, FramingError> {
        loop {
            match split(&self.buf) {
                Ok(Some(len)) => {
                    let frame = self.buf.split_to(len).to_vec();
                    return Ok(Some(frame));
                }
                Ok(None) => {}
                Err(e) => {
                    let skip = header_end(&self.buf).unwrap_or(self.buf.len());
                    self.buf.advance(skip);
                    return Err(e);
                }
            }

            let n = self.inner.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(FramingError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Client closed connection mid-frame",
                )));
            }
        }
    }
}

/// Writes framed messages to an async stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<(), FramingError> {
        let framed = encode(message)?;
        tracing::trace!("LSP -> {}", String::from_utf8_lossy(&framed));

        self.inner.write_all(&framed).await?;
        self.inner.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::lsp::protocol::{Notification, RequestId};

    fn frame(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let message = Notification::new(
            "textDocument/didOpen",
            Some(serde_json::json!({"textDocument": {"uri": "file:///a.go", "text": "é"}})),
        );
        let framed = encode(&message).unwrap();
        let incoming = decode(&framed).unwrap();

        assert_eq!(incoming.method, "textDocument/didOpen");
        assert!(incoming.id.is_none());
        assert_eq!(incoming.body, serde_json::to_vec(&message).unwrap());
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let message = serde_json::json!({"k": "é"});
        let framed = String::from_utf8(encode(&message).unwrap()).unwrap();
        assert!(framed.starts_with("Content-Length: 10\r\n\r\n"));
    }

    #[test]
    fn test_split_waits_for_full_body() {
        let full = frame(r#"{"jsonrpc":"2.0","id":1,"method":"shutdown"}"#);
        for cut in 0..full.len() {
            assert_eq!(split(&full[..cut]).unwrap(), None, "cut at {}", cut);
        }
        assert_eq!(split(&full).unwrap(), Some(full.len()));
    }

    #[test]
    fn test_split_returns_first_of_many() {
        let first = frame(r#"{"jsonrpc":"2.0","method":"initialized"}"#);
        let mut buf = first.clone();
        buf.extend(frame(r#"{"jsonrpc":"2.0","method":"exit"}"#));
        assert_eq!(split(&buf).unwrap(), Some(first.len()));
    }

    #[test]
    fn test_split_ignores_extra_headers() {
        let body = r#"{"jsonrpc":"2.0","method":"exit"}"#;
        let buf = format!(
            "Content-Type: application/vscode-jsonrpc; charset=utf-8\r\ncontent-length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        assert_eq!(split(buf.as_bytes()).unwrap(), Some(buf.len()));
    }

    #[test]
    fn test_missing_content_length_is_malformed_header() {
        let err = split(b"Content-Type: json\r\n\r\n{}").unwrap_err();
        assert!(matches!(err, FramingError::MalformedHeader(_)));
    }

    #[test]
    fn test_invalid_content_length_is_malformed_header() {
        let err = decode(b"Content-Length: ten\r\n\r\n{}").unwrap_err();
        assert!(matches!(err, FramingError::MalformedHeader(_)));
    }

    #[test]
    fn test_invalid_json_is_malformed_body() {
        let err = decode(&frame("not json at all")).unwrap_err();
        assert!(matches!(err, FramingError::MalformedBody(_)));
    }

    #[test]
    fn test_unbounded_header_rejected() {
        let garbage = vec![b'x'; MAX_HEADER_BYTES + 1];
        assert!(matches!(
            split(&garbage),
            Err(FramingError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_huge_content_length_is_malformed_header() {
        let buf = format!("Content-Length: {}\r\n\r\n{{}}", u64::MAX);
        assert!(matches!(
            split(buf.as_bytes()),
            Err(FramingError::MalformedHeader(_))
        ));
        assert!(matches!(
            decode(buf.as_bytes()),
            Err(FramingError::MalformedHeader(_))
        ));

        let oversized = format!("Content-Length: {}\r\n\r\n", MAX_BODY_BYTES + 1);
        assert!(matches!(
            split(oversized.as_bytes()),
            Err(FramingError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_frame_len_overflow() {
        assert!(frame_len(40, usize::MAX).is_err());
        assert_eq!(frame_len(40, 2).unwrap(), 42);
    }

    #[tokio::test]
    async fn test_reader_recovers_after_huge_content_length() {
        let mut bytes = format!("Content-Length: {}\r\n\r\n", u64::MAX).into_bytes();
        bytes.extend(frame(r#"{"jsonrpc":"2.0","method":"exit"}"#));
        let mut reader = FrameReader::new(bytes.as_slice());

        assert!(matches!(
            reader.read_frame().await,
            Err(FramingError::MalformedHeader(_))
        ));
        let next = decode(&reader.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(next.method, "exit");
    }

    #[tokio::test]
    async fn test_reader_handles_chunked_stream() {
        let mut bytes = frame(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        bytes.extend(frame(r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#));

        let mut builder = tokio_test::io::Builder::new();
        for chunk in bytes.chunks(7) {
            builder.read(chunk);
        }
        let mut reader = FrameReader::new(builder.build());

        let first = decode(&reader.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(first.method, "initialize");
        assert_eq!(first.id, Some(RequestId::Number(1)));

        let second = decode(&reader.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(second.method, "initialized");

        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reader_recovers_after_malformed_header() {
        let mut bytes = b"Bogus-Header\r\n\r\n".to_vec();
        bytes.extend(frame(r#"{"jsonrpc":"2.0","method":"exit"}"#));
        let mut reader = FrameReader::new(bytes.as_slice());

        assert!(matches!(
            reader.read_frame().await,
            Err(FramingError::MalformedHeader(_))
        ));
        let next = decode(&reader.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(next.method, "exit");
    }

    #[tokio::test]
    async fn test_reader_eof_mid_body_is_io_error() {
        let bytes: &[u8] = b"Content-Length: 100\r\n\r\nhello";
        let mut reader = FrameReader::new(bytes);
        let err = reader.read_frame().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_writer_frames_message() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .write_message(&serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": null}))
            .await
            .unwrap();
        let out = writer.into_inner();
        let incoming_len = split(&out).unwrap();
        assert_eq!(incoming_len, Some(out.len()));
    }
}
