use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

/// Session-wide deadline. A watchdog thread shuts the socket down once
/// `timeout` elapses, which makes any blocked read or write on it fail.
///
/// Dropping the guard disarms the watchdog and joins it.
pub(crate) struct Deadline {
    timeout: Duration,
    expired: Arc<AtomicBool>,
    cancel: Option<mpsc::Sender<()>>,
    watchdog: Option<JoinHandle<()>>,
}

impl Deadline {
    pub(crate) fn arm(stream: &TcpStream, timeout: Duration) -> io::Result<Self> {
        let watched = stream.try_clone()?;
        let (cancel, cancelled) = mpsc::channel::<()>();
        let expired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&expired);

        let watchdog = thread::Builder::new()
            .name("smtp-deadline".to_string())
            .spawn(move || {
                // a dropped sender disconnects the channel: disarmed
                if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(timeout) {
                    flag.store(true, Ordering::SeqCst);
                    let peer = watched
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "<unknown>".to_string());
                    warn!(%peer, ?timeout, "SMTP session deadline exceeded, closing connection");
                    let _ = watched.shutdown(Shutdown::Both);
                }
            })?;

        Ok(Self {
            timeout,
            expired,
            cancel: Some(cancel),
            watchdog: Some(watchdog),
        })
    }

    pub(crate) fn expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        drop(self.cancel.take());
        if let Some(watchdog) = self.watchdog.take() {
            let _ = watchdog.join();
        }
    }
}
