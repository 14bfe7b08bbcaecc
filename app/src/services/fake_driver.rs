//! In-process W3C WebDriver server for browser tests.
//!
//! Serves one request per connection on a plain `TcpListener` thread and
//! keeps just enough window bookkeeping to behave like chromedriver: new
//! tabs need a live current window, closing the last window ends the
//! session, and unknown sessions answer `invalid session id`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use serde_json::{Value, json};

#[derive(Default)]
struct DriverState {
    session: Option<String>,
    windows: Vec<String>,
    current: Option<String>,
    next_window: u32,
    sessions_started: u32,
    quits: u32,
    navigations: Vec<(String, String)>,
}

impl DriverState {
    fn new_window(&mut self) -> String {
        self.next_window += 1;
        format!("w{}", self.next_window)
    }

    fn current_is_open(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| self.windows.contains(current))
    }
}

pub struct FakeDriver {
    state: Arc<Mutex<DriverState>>,
    pub url: String,
}

impl FakeDriver {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(DriverState::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let shared = Arc::clone(&shared);
                thread::spawn(move || serve(stream, &shared));
            }
        });
        Self { state, url }
    }

    fn state(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap()
    }

    pub fn windows(&self) -> Vec<String> {
        self.state().windows.clone()
    }

    pub fn sessions_started(&self) -> u32 {
        self.state().sessions_started
    }

    pub fn quits(&self) -> u32 {
        self.state().quits
    }

    pub fn has_session(&self) -> bool {
        self.state().session.is_some()
    }

    /// `(window, url)` for every navigation, in order.
    pub fn navigations(&self) -> Vec<(String, String)> {
        self.state().navigations.clone()
    }

    /// The user closes a tab. The driver keeps pointing at it if it was
    /// the current one.
    pub fn close_by_hand(&self, handle: &str) {
        self.state().windows.retain(|w| w != handle);
    }

    /// The user closes the whole browser.
    pub fn close_browser(&self) {
        let mut state = self.state();
        state.session = None;
        state.windows.clear();
        state.current = None;
    }
}

fn serve(mut stream: TcpStream, state: &Mutex<DriverState>) {
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };
    let (status, value) = route(&mut state.lock().unwrap(), &method, &path, &body);
    let body = json!({ "value": value }).to_string();
    let reason = if status == 200 { "OK" } else { "Not Found" };
    let _ = write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
}

fn read_request(stream: &mut TcpStream) -> Option<(String, String, Value)> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                length = value.trim().parse().ok()?;
            }
        }
    }

    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).ok()?
    };
    Some((method, path, body))
}

fn error(kind: &str) -> (u16, Value) {
    (404, json!({ "error": kind, "message": kind, "stacktrace": "" }))
}

fn route(state: &mut DriverState, method: &str, path: &str, body: &Value) -> (u16, Value) {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        ("POST", ["session"]) => {
            state.sessions_started += 1;
            let id = format!("s{}", state.sessions_started);
            let window = state.new_window();
            state.session = Some(id.clone());
            state.windows = vec![window.clone()];
            state.current = Some(window);
            (200, json!({ "sessionId": id, "capabilities": {} }))
        }
        ("DELETE", ["session", id]) => {
            state.quits += 1;
            if state.session.as_deref() != Some(*id) {
                return error("invalid session id");
            }
            state.session = None;
            state.windows.clear();
            state.current = None;
            (200, Value::Null)
        }
        (_, ["session", id, command @ ..]) => {
            if state.session.as_deref() != Some(*id) {
                return error("invalid session id");
            }
            session_command(state, method, command, body)
        }
        _ => error("unknown command"),
    }
}

fn session_command(
    state: &mut DriverState,
    method: &str,
    command: &[&str],
    body: &Value,
) -> (u16, Value) {
    match (method, command) {
        ("GET", ["window", "handles"]) => (200, json!(state.windows)),
        ("POST", ["window", "new"]) => {
            if !state.current_is_open() {
                return error("no such window");
            }
            let handle = state.new_window();
            state.windows.push(handle.clone());
            (200, json!({ "handle": handle, "type": "tab" }))
        }
        ("POST", ["window"]) => {
            let handle = body["handle"].as_str().unwrap_or_default().to_string();
            if !state.windows.contains(&handle) {
                return error("no such window");
            }
            state.current = Some(handle);
            (200, Value::Null)
        }
        ("GET", ["window"]) if state.current_is_open() => (200, json!(state.current)),
        ("GET", ["window"]) => error("no such window"),
        ("DELETE", ["window"]) => {
            if !state.current_is_open() {
                return error("no such window");
            }
            let closed = state.current.take();
            state.windows.retain(|w| Some(w) != closed.as_ref());
            let remaining = json!(state.windows);
            if state.windows.is_empty() {
                state.session = None;
            }
            (200, remaining)
        }
        ("POST", ["url"]) => {
            if !state.current_is_open() {
                return error("no such window");
            }
            let url = body["url"].as_str().unwrap_or_default().to_string();
            let window = state.current.clone().unwrap_or_default();
            state.navigations.push((window, url));
            (200, Value::Null)
        }
        _ => error("unknown command"),
    }
}
