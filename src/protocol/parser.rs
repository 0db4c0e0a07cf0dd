//! FTP Reply parsing
//!
//! Splits reply lines into code and text and reads complete replies,
//! including multi-line ones, from the control connection.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::ReplyError;
use crate::protocol::Reply;

/// Whether a reply line ends the reply or is followed by more lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Final,
    Continuation,
}

/// Limits applied while reading a reply
#[derive(Debug, Clone, Copy)]
pub struct ReplyLimits {
    pub max_line_len: usize,
    pub max_lines: usize,
}

impl Default for ReplyLimits {
    fn default() -> Self {
        Self {
            max_line_len: 2048,
            max_lines: 256,
        }
    }
}

/// Parses the first line of a reply: `<code> <text>` or `<code>-<text>`.
///
/// A bare code with no separator is accepted as a final line.
pub fn parse_reply_line(line: &str) -> Result<(u16, LineKind, &str), ReplyError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(ReplyError::InvalidLineFormat(line.to_string()));
    }

    let code: u16 = line[..3]
        .parse()
        .map_err(|_| ReplyError::InvalidReplyCode(line[..3].to_string()))?;
    if !(100..600).contains(&code) {
        return Err(ReplyError::InvalidReplyCode(line[..3].to_string()));
    }

    match bytes.get(3) {
        None => Ok((code, LineKind::Final, "")),
        Some(b' ') => Ok((code, LineKind::Final, &line[4..])),
        Some(b'-') => Ok((code, LineKind::Continuation, &line[4..])),
        Some(_) => Err(ReplyError::InvalidLineFormat(line.to_string())),
    }
}

/// Reads one bounded line, without its line terminator.
async fn read_line<R>(reader: &mut R, max_len: usize) -> Result<String, ReplyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(128);
    let len = (&mut *reader)
        .take(max_len as u64)
        .read_until(b'\n', &mut buf)
        .await
        .map_err(ReplyError::ReadFailed)?;

    if len == 0 {
        return Err(ReplyError::ConnectionClosed);
    }
    if buf.last() != Some(&b'\n') {
        if len >= max_len {
            return Err(ReplyError::LineTooLong(max_len));
        }
        // peer closed mid-line
        return Err(ReplyError::ConnectionClosed);
    }

    let line = String::from_utf8(buf).map_err(|_| ReplyError::LineIsNotUtf8)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads one complete reply.
///
/// For multi-line replies keeps reading until a line starting with the
/// opening code followed by a space.
pub async fn read_reply<R>(reader: &mut R, limits: ReplyLimits) -> Result<Reply, ReplyError>
where
    R: AsyncBufRead + Unpin,
{
    let first = read_line(reader, limits.max_line_len).await?;
    let (code, kind, text) = parse_reply_line(&first)?;
    if kind == LineKind::Final {
        return Ok(Reply::new(code, text));
    }

    let end_prefix = format!("{code} ");
    let mut lines = vec![text.to_string()];
    for _ in 1..limits.max_lines {
        let line = read_line(reader, limits.max_line_len).await?;
        if let Some(rest) = line.strip_prefix(&end_prefix) {
            lines.push(rest.to_string());
            return Ok(Reply::multi_line(code, lines));
        }
        if line == end_prefix.trim_end() {
            lines.push(String::new());
            return Ok(Reply::multi_line(code, lines));
        }
        // do not trim leading whitespace of continuation lines
        lines.push(line);
    }
    Err(ReplyError::TooManyLines(limits.max_lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn parse_single_and_continuation_lines() {
        assert_eq!(
            parse_reply_line("220 Service ready\r\n").unwrap(),
            (220, LineKind::Final, "Service ready")
        );
        assert_eq!(
            parse_reply_line("230-Welcome").unwrap(),
            (230, LineKind::Continuation, "Welcome")
        );
        assert_eq!(parse_reply_line("200").unwrap(), (200, LineKind::Final, ""));
    }

    #[test]
    fn reject_malformed_lines() {
        assert!(matches!(
            parse_reply_line("hello"),
            Err(ReplyError::InvalidLineFormat(_))
        ));
        assert!(matches!(
            parse_reply_line("22"),
            Err(ReplyError::InvalidLineFormat(_))
        ));
        assert!(matches!(
            parse_reply_line("220x"),
            Err(ReplyError::InvalidLineFormat(_))
        ));
        assert!(matches!(
            parse_reply_line("999 nope"),
            Err(ReplyError::InvalidReplyCode(_))
        ));
    }

    #[tokio::test]
    async fn read_multi_line_reply() {
        let data = b"230-Welcome\r\n motd line\r\n230-still here\r\n230 Logged in\r\n200 next\r\n";
        let mut reader = BufReader::new(&data[..]);

        let reply = read_reply(&mut reader, ReplyLimits::default()).await.unwrap();
        assert_eq!(reply.code(), 230);
        assert_eq!(
            reply.lines(),
            ["Welcome", " motd line", "230-still here", "Logged in"]
        );

        // the following reply is left untouched
        let next = read_reply(&mut reader, ReplyLimits::default()).await.unwrap();
        assert_eq!(next.code(), 200);
        assert_eq!(next.text(), "next");
    }

    #[tokio::test]
    async fn read_two_replies_from_one_segment() {
        let data = b"150 Opening\r\n226 Done\r\n";
        let mut reader = BufReader::new(&data[..]);
        let first = read_reply(&mut reader, ReplyLimits::default()).await.unwrap();
        let second = read_reply(&mut reader, ReplyLimits::default()).await.unwrap();
        assert_eq!(first.code(), 150);
        assert_eq!(second.code(), 226);
    }

    #[tokio::test]
    async fn eof_is_connection_closed() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(matches!(
            read_reply(&mut reader, ReplyLimits::default()).await,
            Err(ReplyError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn limits_are_enforced() {
        let long = format!("200 {}\r\n", "x".repeat(64));
        let mut reader = BufReader::new(long.as_bytes());
        let limits = ReplyLimits {
            max_line_len: 16,
            max_lines: 4,
        };
        assert!(matches!(
            read_reply(&mut reader, limits).await,
            Err(ReplyError::LineTooLong(16))
        ));

        let many = b"211-a\r\nb\r\nc\r\nd\r\ne\r\n211 end\r\n";
        let mut reader = BufReader::new(&many[..]);
        assert!(matches!(
            read_reply(&mut reader, limits).await,
            Err(ReplyError::TooManyLines(4))
        ));
    }
}
