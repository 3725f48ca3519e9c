#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Directory holding a `flapi.yaml`, removed on drop.
    pub struct ConfigDir {
        dir: TempDir,
    }

    impl ConfigDir {
        pub fn new(config: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("flapi.yaml"), config).unwrap();
            Self { dir }
        }

        pub fn config_path(&self) -> PathBuf {
            self.dir.path().join("flapi.yaml")
        }

        /// Replace the main configuration file.
        pub fn rewrite(&self, config: &str) {
            std::fs::write(self.config_path(), config).unwrap();
        }

        /// Write an extra file next to the main configuration.
        pub fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path
        }
    }
}

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Status, lowercase headers and body of one HTTP response.
    pub struct HttpResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl HttpResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Send one request and read until the declared body length arrives.
    pub fn send_request(addr: &SocketAddr, method: &str, path: &str) -> HttpResponse {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 0\r\n\r\n");
        send_raw(addr, &raw)
    }

    pub fn send_raw(addr: &SocketAddr, raw: &str) -> HttpResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(2000)))
            .unwrap();

        let mut buf = Vec::new();
        loop {
            if let Some(response) = parse_complete(&buf) {
                return response;
            }
            let mut tmp = [0u8; 4096];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        parse_complete(&buf).unwrap_or_else(|| {
            panic!("incomplete response: {}", String::from_utf8_lossy(&buf))
        })
    }

    fn parse_complete(buf: &[u8]) -> Option<HttpResponse> {
        let text = std::str::from_utf8(buf).ok()?;
        let (head, body) = text.split_once("\r\n\r\n")?;
        let mut lines = head.lines();
        let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        let length: usize = headers
            .iter()
            .find(|(n, _)| n == "content-length")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        if body.len() < length {
            return None;
        }
        Some(HttpResponse {
            status,
            headers,
            body: body[..length].to_string(),
        })
    }
}
