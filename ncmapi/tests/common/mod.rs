//! In-process stand-in for the gateway.
//!
//! Listens on an ephemeral loopback port, records every request, and answers
//! from a route function. Each connection is handled on its own thread and
//! closed after one response.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub cookie: Option<String>,
}

impl Hit {
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What the stub sends back.
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub set_cookie: Option<&'static str>,
    pub delay_ms: u64,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_owned(),
            set_cookie: None,
            delay_ms: 0,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            ..Self::json(body)
        }
    }
}

pub struct StubGateway {
    pub port: u16,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubGateway {
    /// Start a stub that answers with `route(path)`.
    pub fn start(route: fn(&str) -> Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || handle(stream, route, &recorded));
            }
        });
        Self { port, hits }
    }

    /// Stub with the usual routes: `/login*` sets a cookie, `/fail` is a
    /// 500, `/not-json` returns text, `/slow` answers after two seconds,
    /// everything else is `{"code":200}`.
    pub fn standard() -> Self {
        Self::start(standard_route)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.hits().iter().filter(|h| h.path == path).count()
    }

    pub fn last(&self, path: &str) -> Hit {
        self.hits()
            .into_iter()
            .rev()
            .find(|h| h.path == path)
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

pub fn standard_route(path: &str) -> Reply {
    match path {
        "/login" | "/login/cellphone" => Reply {
            set_cookie: Some("MUSIC_U=stub-session; Path=/"),
            ..Reply::json(r#"{"code":200,"account":{"id":1}}"#)
        },
        "/fail" => Reply::status(500, r#"{"code":500,"msg":"boom"}"#),
        "/missing" => Reply::status(404, r#"{"code":404,"msg":"not found"}"#),
        "/not-json" => Reply::json("<html>oops</html>"),
        "/slow" => Reply {
            delay_ms: 2000,
            ..Reply::json(r#"{"code":200}"#)
        },
        _ => Reply::json(r#"{"code":200}"#),
    }
}

fn handle(stream: TcpStream, route: fn(&str) -> Reply, hits: &Mutex<Vec<Hit>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut cookie = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_owned());
            }
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    hits.lock().unwrap().push(Hit {
        path: path.to_owned(),
        query: ncmapi::types::parse_query(query),
        cookie,
    });

    let reply = route(path);
    if reply.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(reply.delay_ms));
    }
    let mut head = format!(
        "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    if let Some(c) = reply.set_cookie {
        head.push_str(&format!("Set-Cookie: {c}\r\n"));
    }
    head.push_str("\r\n");
    let mut stream = stream;
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(reply.body.as_bytes());
    let _ = stream.flush();
}
