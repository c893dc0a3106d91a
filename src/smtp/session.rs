use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::deadline::Deadline;
use super::error::{ProtocolError, SmtpStage};
use super::reply::SmtpReply;

/// Longest reply line accepted, CRLF included.
const MAX_REPLY_LINE: u64 = 1024;
/// Most lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 64;

/// Plain-text SMTP client connection. Both socket handles and the deadline
/// watchdog are released when the session is dropped.
pub(crate) struct SmtpSession {
    deadline: Option<Deadline>,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    /// Resolves `host` and dials its addresses in turn. Name resolution and
    /// every attempt share the single `connect_timeout` budget.
    pub(crate) fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> io::Result<(Self, SocketAddr)> {
        let until = Instant::now() + connect_timeout;
        let addrs = resolve_host(host, port, connect_timeout)?;
        let (stream, addr) = dial(&addrs, until)?;
        let reader = BufReader::new(stream.try_clone()?);
        let session = Self {
            deadline: None,
            stream,
            reader,
        };
        Ok((session, addr))
    }

    /// Starts the session-wide deadline. Every later read or write fails once
    /// it expires.
    pub(crate) fn arm_deadline(&mut self, timeout: Duration) -> io::Result<()> {
        self.deadline = Some(Deadline::arm(&self.stream, timeout)?);
        Ok(())
    }

    /// Reads the reply for `stage`, sending `command` first when there is one.
    pub(crate) fn exchange(
        &mut self,
        stage: SmtpStage,
        command: Option<&str>,
    ) -> Result<SmtpReply, ProtocolError> {
        if let Some(command) = command {
            debug!(%stage, "C: {command}");
            self.send_command(command)
                .map_err(|err| self.failure(stage, &err))?;
        }
        let reply = self.read_reply().map_err(|err| self.failure(stage, &err))?;
        debug!(%stage, "S: {reply}");
        Ok(reply)
    }

    fn failure(&self, stage: SmtpStage, err: &io::Error) -> ProtocolError {
        match &self.deadline {
            Some(deadline) if deadline.expired() => {
                ProtocolError::deadline_exceeded(stage, deadline.timeout())
            }
            _ => ProtocolError::transport(stage, err),
        }
    }

    fn send_command(&mut self, command: &str) -> io::Result<()> {
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()
    }

    fn read_reply(&mut self) -> io::Result<SmtpReply> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() == MAX_REPLY_LINES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SMTP reply exceeds {MAX_REPLY_LINES} lines"),
                ));
            }
            let mut raw = String::new();
            let bytes = (&mut self.reader).take(MAX_REPLY_LINE).read_line(&mut raw)?;
            if bytes == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ));
            }
            if bytes as u64 == MAX_REPLY_LINE && !raw.ends_with('\n') {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SMTP reply line exceeds {MAX_REPLY_LINE} bytes"),
                ));
            }
            if raw.ends_with('\n') {
                raw.pop();
                if raw.ends_with('\r') {
                    raw.pop();
                }
            }

            let (parsed_code, continuation, text) = SmtpReply::parse_line(&raw)
                .map_err(|msg| io::Error::new(io::ErrorKind::InvalidData, msg))?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                    ));
                }
            } else {
                code = Some(parsed_code);
            }
            message_lines.push(text.to_string());
            if !continuation {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
            })?,
            message: message_lines.join("\n"),
        })
    }
}

/// `to_socket_addrs` has no timeout of its own, so names are resolved on a
/// helper thread that is abandoned once `budget` runs out.
fn resolve_host(host: &str, port: u16, budget: Duration) -> io::Result<Vec<SocketAddr>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let (tx, rx) = mpsc::channel();
    let target = (host.to_string(), port);
    thread::Builder::new()
        .name("smtp-resolve".to_string())
        .spawn(move || {
            let resolved = target
                .to_socket_addrs()
                .map(|addrs| addrs.collect::<Vec<_>>());
            let _ = tx.send(resolved);
        })?;

    match rx.recv_timeout(budget) {
        Ok(resolved) => resolved,
        Err(RecvTimeoutError::Timeout) => {
            debug!(host, ?budget, "exchanger name resolution timed out");
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "exchanger name resolution timed out",
            ))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("exchanger name resolution aborted"))
        }
    }
}

/// Tries each address with whatever is left of the budget ending at `until`.
fn dial(addrs: &[SocketAddr], until: Instant) -> io::Result<(TcpStream, SocketAddr)> {
    let mut last_err = None;
    for &addr in addrs {
        let remaining = until.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            last_err = Some(io::Error::new(
                io::ErrorKind::TimedOut,
                "connect timeout exhausted",
            ));
            break;
        }
        match TcpStream::connect_timeout(&addr, remaining) {
            Ok(stream) => return Ok((stream, addr)),
            Err(err) => {
                debug!(%addr, error = %err, "TCP connect failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "no socket address available",
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn refused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    }

    #[test]
    fn ip_literal_needs_no_lookup() {
        let addrs = resolve_host("127.0.0.1", 2525, Duration::ZERO).expect("literal");
        assert_eq!(addrs, ["127.0.0.1:2525".parse::<SocketAddr>().expect("addr")]);
    }

    #[test]
    fn dial_moves_past_refused_addresses() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let good = listener.local_addr().expect("addr");
        let until = Instant::now() + Duration::from_secs(5);

        let (_stream, addr) = dial(&[refused_addr(), good], until).expect("second address");
        assert_eq!(addr, good);
    }

    #[test]
    fn dial_stops_once_budget_is_spent() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        listener.set_nonblocking(true).expect("nonblocking");

        let err = dial(&[addr, addr], Instant::now()).expect_err("no budget left");
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        let pending = listener.accept().expect_err("no connection attempted");
        assert_eq!(pending.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn overlong_reply_line_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let line = format!("220 {}\r\n", "x".repeat(4096));
            let _ = stream.write_all(line.as_bytes());
            let mut buf = [0u8; 16];
            let _ = stream.read(&mut buf);
        });

        let (mut session, _) =
            SmtpSession::connect("127.0.0.1", port, Duration::from_secs(2)).expect("connect");
        let err = session
            .exchange(SmtpStage::Greeting, None)
            .expect_err("line too long");
        assert_eq!(err.status_code(), None);
        assert!(err.raw_message().contains("exceeds 1024 bytes"), "{err}");

        drop(session);
        server.join().expect("server thread");
    }

    #[test]
    fn endless_continuation_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let reply = "220-more\r\n".repeat(MAX_REPLY_LINES + 1);
            let _ = stream.write_all(reply.as_bytes());
            let mut buf = [0u8; 16];
            let _ = stream.read(&mut buf);
        });

        let (mut session, _) =
            SmtpSession::connect("127.0.0.1", port, Duration::from_secs(2)).expect("connect");
        let err = session
            .exchange(SmtpStage::Greeting, None)
            .expect_err("too many lines");
        assert!(err.raw_message().contains("lines"), "{err}");

        drop(session);
        server.join().expect("server thread");
    }
}
