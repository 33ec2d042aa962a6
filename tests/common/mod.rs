//! Shared helpers for integration tests: canned service responses, one-shot
//! local servers, and a CLI runner that keeps a log per case.

#![allow(dead_code)]

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SNAPSHOT_BODY: &str = r#"{
  "queues": [
    {"name": "wan_OUT", "rate": "45Mbps", "max_limit": "50M", "bytes": 5368709120, "utilization": 92.4},
    {"name": "lan_IN", "rate": "800k", "max_limit": "10M", "bytes": 1048576, "utilization": 8.0},
    {"name": "voip_OUT", "rate": "7.5M", "max_limit": "10M", "bytes": 0, "utilization": 75.0}
  ],
  "system_stats": {
    "total_queues": 3,
    "total_upload": "52.5 Mbps",
    "total_download": "800 kbps",
    "high_utilization": 2,
    "average_utilization": 58.5
  },
  "timestamp": 1704164645
}"#;

/// A `queue_update` frame as the streaming channel sends it.
pub fn queue_update_frame(name: &str, utilization: f64) -> String {
    format!(
        r#"{{"type":"queue_update","data":{{"queues":[{{"name":"{name}","rate":"10Mbps","max_limit":"100Mbps","bytes":1024,"utilization":{utilization}}}],"system_stats":{{"total_queues":1,"total_upload":"10 Mbps"}}}}}}"#
    )
}

/// Raw HTTP/1.1 response with a JSON body.
pub fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve `response` to one client on a background thread.
///
/// Returns the base URL (`http://127.0.0.1:<port>`).
pub fn serve_http_once(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let port = listener.local_addr().expect("local addr").port();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://127.0.0.1:{port}")
}

// ──────────────────── CLI runner ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_rqm") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "rqm.exe" } else { "rqm" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve rqm binary path for integration test"),
    }
}

/// Run the CLI with an isolated HOME so no user config leaks in.
pub fn run_cli_case(case_name: &str, home: &Path, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("rqm-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let output = Command::new(&bin_path)
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RQM_SERVER_URL")
        .env_remove("RQM_EXPORT_DIR")
        .env_remove("RQM_LOG_FILE")
        .env("RUST_BACKTRACE", "1")
        .output()
        .expect("execute rqm command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_content = format!(
        "case={case_name}\nbinary={}\nargs={args:?}\nstatus={:?}\n\n[stdout]\n{stdout}\n[stderr]\n{stderr}\n",
        bin_path.display(),
        output.status.code(),
    );
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
