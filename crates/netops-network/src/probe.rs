//! ICMP reachability probing
//!
//! The prober takes an already validated [`Ipv4Addr`]; it never reports a
//! low-level failure to its caller. Timeouts, missing permissions, a missing
//! `ping` binary and unreachable hosts all read as "not reachable".

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Reachability probe of a single host
#[async_trait]
pub trait Prober: Send + Sync {
    /// `true` if the host answered
    async fn probe(&self, host: Ipv4Addr) -> bool;
}

/// Prober backed by the system `ping` binary
#[derive(Debug, Clone)]
pub struct PingProber {
    /// Echo requests per probe
    count: u32,
    /// Wait for each reply
    reply_timeout: Duration,
    program: String,
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(2))
    }
}

impl PingProber {
    pub fn new(count: u32, reply_timeout: Duration) -> Self {
        Self {
            count: count.max(1),
            reply_timeout,
            program: "ping".to_string(),
        }
    }

    /// Use a different executable (tests, non-standard installs)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self, host: Ipv4Addr) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.count.to_string(),
            "-W".to_string(),
            self.reply_timeout.as_secs().max(1).to_string(),
            host.to_string(),
        ]
    }

    /// Upper bound on the whole subprocess run
    fn deadline(&self) -> Duration {
        self.reply_timeout * (self.count + 1) + Duration::from_secs(1)
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, host: Ipv4Addr) -> bool {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(self.deadline(), command.status()).await {
            Ok(Ok(status)) => {
                debug!(%host, code = ?status.code(), "ping finished");
                status.success()
            }
            Ok(Err(e)) => {
                warn!(%host, error = %e, "ping could not be run, treating host as unreachable");
                false
            }
            Err(_) => {
                warn!(%host, "ping timed out, treating host as unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let prober = PingProber::new(2, Duration::from_secs(3));
        assert_eq!(
            prober.args(Ipv4Addr::new(8, 8, 8, 8)),
            vec!["-c", "2", "-W", "3", "8.8.8.8"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_reads_as_unreachable() {
        let prober = PingProber::default().with_program("/nonexistent/netops-ping");
        assert!(!prober.probe(Ipv4Addr::LOCALHOST).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_maps_to_result() {
        let ok = PingProber::default().with_program("true");
        assert!(ok.probe(Ipv4Addr::LOCALHOST).await);
        let failed = PingProber::default().with_program("false");
        assert!(!failed.probe(Ipv4Addr::LOCALHOST).await);
    }
}
