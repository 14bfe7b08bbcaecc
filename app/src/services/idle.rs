//! Seconds since the last keyboard or mouse input on this machine.
//!
//! Windows asks the input subsystem directly; Linux shells out to
//! `xprintidle` (X11); macOS reads `HIDIdleTime` from `ioreg`. When the
//! probe fails the operator is reported as present, which never opens a
//! tab on a desk somebody is sitting at.

use std::cell::Cell;

use async_trait::async_trait;

/// Source of the idle signal. Called once per tick.
#[async_trait(?Send)]
pub trait IdleSource {
    async fn seconds_idle(&self) -> f64;
}

/// Idle time as reported by the host OS.
#[derive(Debug, Default)]
pub struct SystemIdle {
    warned: Cell<bool>,
}

impl SystemIdle {
    /// Warn on the first failed probe only. Returns whether it warned.
    fn note_probe_failure(&self) -> bool {
        if self.warned.replace(true) {
            return false;
        }
        tracing::warn!(
            "Could not read the idle time, the operator is treated as present and no tabs will be opened. \
             On Linux this needs xprintidle and an X11 session"
        );
        true
    }
}

#[async_trait(?Send)]
impl IdleSource for SystemIdle {
    async fn seconds_idle(&self) -> f64 {
        match probe().await {
            Some(secs) => {
                tracing::debug!(secs, "Idle duration");
                secs
            }
            None => {
                self.note_probe_failure();
                0.0
            }
        }
    }
}

#[cfg(target_os = "windows")]
async fn probe() -> Option<f64> {
    use windows::Win32::System::SystemInformation::GetTickCount;
    use windows::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

    let mut info = LASTINPUTINFO {
        cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
        dwTime: 0,
    };
    // SAFETY: `info` is a properly sized, writable LASTINPUTINFO.
    let ok = unsafe { GetLastInputInfo(&mut info) }.as_bool();
    if !ok {
        tracing::debug!("GetLastInputInfo failed");
        return None;
    }
    // SAFETY: no preconditions.
    let now = unsafe { GetTickCount() };
    Some(f64::from(now.wrapping_sub(info.dwTime)) / 1000.0)
}

#[cfg(target_os = "linux")]
async fn probe() -> Option<f64> {
    let stdout = run_probe("xprintidle", &[]).await?;
    parse_xprintidle(&stdout)
}

#[cfg(target_os = "macos")]
async fn probe() -> Option<f64> {
    let stdout = run_probe("ioreg", &["-c", "IOHIDSystem", "-d", "4"]).await?;
    parse_ioreg(&stdout)
}

#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
async fn probe() -> Option<f64> {
    None
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
async fn run_probe(program: &str, args: &[&str]) -> Option<String> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            tracing::debug!(program, exit_code = ?output.status.code(), "Idle probe failed");
            None
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "Failed to spawn idle probe");
            None
        }
    }
}

/// `xprintidle` prints milliseconds since last input.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_xprintidle(stdout: &str) -> Option<f64> {
    let millis: u64 = stdout.trim().parse().ok()?;
    Some(millis as f64 / 1000.0)
}

/// `ioreg` reports `"HIDIdleTime" = <nanoseconds>`.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg(stdout: &str) -> Option<f64> {
    let line = stdout.lines().find(|l| l.contains("\"HIDIdleTime\""))?;
    let nanos: u64 = line.rsplit('=').next()?.trim().parse().ok()?;
    Some(nanos as f64 / 1_000_000_000.0)
}
