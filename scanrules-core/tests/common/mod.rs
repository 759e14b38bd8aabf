//! Test helpers shared by the integration tests
//!
//! Fixture README/archive builders, a scripted in-memory [`ToolSource`],
//! and a minimal loopback HTTP server for the real clients.

#![allow(dead_code)]

use async_trait::async_trait;
use scanrules_core::{ArchiveError, RawRuleRecord, RegistryError, ToolMetadata, ToolSource};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const RULE_INFO_ENTRY: &str = "resources/rule-info.json";

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const README: &str = "\
# Scan Tool

Static code analysis for Ballerina.

## Rules

### ballerina:1 - Avoid checkpanic

Use `check` instead of panicking.

```ballerina
int x = check parse(s);
```

### ballerina:2 - Unused variable

Remove unused variables.

## Contributing

### ballerina:3 - Not a rule section

Ignored.
";

pub const RULES_JSON: &str = r#"[
  {
    "title": "Avoid checkpanic",
    "type": "code_smell",
    "status": "ready",
    "remediation": {"func": "Constant/Issue", "constantCost": "5min"},
    "tags": ["error-handling"],
    "defaultSeverity": "major",
    "ruleSpecification": "RSPEC-0001",
    "sqKey": "ballerina:1",
    "scope": "Main",
    "quickfix": "unknown"
  },
  {
    "title": "Unused variable",
    "type": "bug",
    "tags": ["clutter"],
    "defaultSeverity": "minor",
    "sqKey": "ballerina:2"
  },
  {
    "title": "Undocumented rule",
    "type": "vulnerability",
    "tags": [],
    "defaultSeverity": "critical",
    "sqKey": "ballerina:3"
  }
]"#;

pub fn test_records() -> Vec<RawRuleRecord> {
    serde_json::from_str(RULES_JSON).expect("fixture rules parse")
}

/// Stored ZIP archive with some unrelated entries around the rule entry
pub fn create_test_archive(rules_json: &str) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    writer.add_directory("resources/", options).unwrap();
    writer.start_file("bala.json", options).unwrap();
    writer.write_all(br#"{"bala_version": "2.0.0"}"#).unwrap();
    writer.start_file(RULE_INFO_ENTRY, options).unwrap();
    writer.write_all(rules_json.as_bytes()).unwrap();
    writer.start_file("modules/scan/main.bal", options).unwrap();
    writer.write_all(b"public function main() {}\n").unwrap();

    writer.finish().unwrap().into_inner()
}

/// Archive as a streaming writer produces it: DEFLATED entries whose CRC and
/// sizes follow the data in a descriptor (flag bit 3), with the rule entry
/// between unrelated entries
pub fn create_streamed_archive(rules_json: &str) -> Vec<u8> {
    use flate2::write::DeflateEncoder;
    use flate2::{Compression, Crc};

    let entries: [(&str, &[u8]); 3] = [
        ("bala.json", br#"{"bala_version": "2.0.0"}"#),
        (RULE_INFO_ENTRY, rules_json.as_bytes()),
        ("modules/scan/main.bal", b"public function main() {}\n"),
    ];

    let mut out = Vec::new();
    for (path, content) in entries {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        let compressed = encoder.finish().unwrap();
        let mut crc = Crc::new();
        crc.update(content);

        out.extend_from_slice(b"PK\x03\x04");
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&(path.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(path.as_bytes());
        out.extend_from_slice(&compressed);

        out.extend_from_slice(b"PK\x07\x08");
        out.extend_from_slice(&crc.sum().to_le_bytes());
        out.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    }

    out.extend_from_slice(b"PK\x05\x06");
    out.extend_from_slice(&[0u8; 18]);
    out
}

/// Call counters shared between a [`FakeSource`] and the test body
#[derive(Debug, Default)]
pub struct SourceCalls {
    pub metadata_calls: AtomicUsize,
    pub archive_calls: AtomicUsize,
    pub fail_registry: AtomicBool,
    pub fail_archive: AtomicBool,
}

impl SourceCalls {
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn archive_calls(&self) -> usize {
        self.archive_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_registry(&self, fail: bool) {
        self.fail_registry.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_archive(&self, fail: bool) {
        self.fail_archive.store(fail, Ordering::SeqCst);
    }
}

/// Scripted in-memory tool source
pub struct FakeSource {
    pub calls: Arc<SourceCalls>,
    pub readme: String,
    pub records: Vec<RawRuleRecord>,
    /// Simulated network latency per call
    pub delay: Duration,
}

impl FakeSource {
    pub fn new() -> (Self, Arc<SourceCalls>) {
        let calls = Arc::new(SourceCalls::default());
        let source = Self {
            calls: Arc::clone(&calls),
            readme: README.to_string(),
            records: test_records(),
            delay: Duration::ZERO,
        };
        (source, calls)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ToolSource for FakeSource {
    async fn fetch_tool_metadata(&self) -> Result<ToolMetadata, RegistryError> {
        self.calls.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.calls.fail_registry.load(Ordering::SeqCst) {
            return Err(RegistryError::Status {
                url: "https://registry.test/tools/scan/".to_string(),
                status: 503,
            });
        }
        Ok(ToolMetadata {
            readme: self.readme.clone(),
            bala_url: "https://files.test/scan.bala".to_string(),
        })
    }

    async fn extract_rule_info(
        &self,
        _archive_url: &str,
    ) -> Result<Vec<RawRuleRecord>, ArchiveError> {
        self.calls.archive_calls.fetch_add(1, Ordering::SeqCst);
        if self.calls.fail_archive.load(Ordering::SeqCst) {
            return Err(ArchiveError::EntryNotFound {
                entry: RULE_INFO_ENTRY.to_string(),
            });
        }
        Ok(self.records.clone())
    }
}

/// Canned response for one path
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Loopback HTTP/1.1 server answering GETs from a fixed route table
pub struct TestServer {
    pub addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    /// Raw request heads, in arrival order
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(Mutex::new(routes));

        let table = Arc::clone(&routes);
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&table);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head).to_string();
                    let path = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();
                    seen.lock().unwrap().push(head);

                    let route = routes.lock().unwrap().get(&path).cloned().unwrap_or(Route {
                        status: 404,
                        content_type: "text/plain",
                        body: b"not found".to_vec(),
                    });
                    let header = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        route.status,
                        if route.status < 400 { "OK" } else { "Error" },
                        route.content_type,
                        route.body.len()
                    );
                    let _ = stream.write_all(header.as_bytes()).await;
                    let _ = stream.write_all(&route.body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            addr,
            routes,
            requests,
        }
    }

    /// Add or replace the response for `path`
    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn request_heads(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Client that never routes loopback traffic through an environment proxy
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test HTTP client")
}
