use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    TimedOut,
    Closed,
}

/// Reads lines on a background thread so a prompt can give up after an idle timeout.
///
/// One reader thread lives for the whole session; a timed-out prompt leaves it waiting
/// and the next prompt picks up whatever line it delivers.
pub struct LineReader {
    rx: Receiver<String>,
}

impl LineReader {
    pub fn stdin() -> Self {
        Self::spawn(io::BufReader::new(io::stdin()))
    }

    pub fn spawn<R: BufRead + Send + 'static>(mut input: R) -> Self {
        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || loop {
            let mut buf = String::new();
            match input.read_line(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(buf).is_err() {
                        break;
                    }
                }
            }
        });
        Self { rx }
    }

    /// `None` waits indefinitely.
    pub fn next(&self, idle: Option<Duration>) -> Input {
        match idle {
            None => self.rx.recv().map_or(Input::Closed, Input::Line),
            Some(limit) => match self.rx.recv_timeout(limit) {
                Ok(line) => Input::Line(line),
                Err(RecvTimeoutError::Timeout) => Input::TimedOut,
                Err(RecvTimeoutError::Disconnected) => Input::Closed,
            },
        }
    }
}
