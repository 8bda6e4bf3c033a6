//! Link-state detection for a host deployment
//!
//! A host has no Wi-Fi association to query, so "connected" means "the
//! store host accepts a TCP connection". Probing costs a round trip, and the
//! monitor asks several times per tick, so the answer is cached for a
//! recheck interval. `reconnect` drops the cache and probes right away.

use std::cell::Cell;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use vayuveer_core::Connectivity;

use crate::ConnectionStats;

/// Reachability check
pub trait Probe {
    /// Check if the remote end is reachable right now
    fn probe(&self) -> bool;
}

/// TCP connect probe against `host:port`
#[derive(Debug, Clone)]
pub struct TcpProbe {
    target: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            target: format!("{}:{}", host, port),
            timeout,
        }
    }
}

impl Probe for TcpProbe {
    fn probe(&self) -> bool {
        let addrs = match self.target.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                log::debug!("Cannot resolve {}: {}", self.target, e);
                return false;
            }
        };

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => log::debug!("Probe of {} failed: {}", addr, e),
            }
        }
        false
    }
}

/// [`Connectivity`] backed by a cached [`Probe`]
pub struct ProbeConnectivity<P = TcpProbe> {
    probe: P,
    recheck: Duration,
    last: Cell<Option<(Instant, bool)>>,
    stats: ConnectionStats,
}

impl<P: Probe> ProbeConnectivity<P> {
    pub fn new(probe: P, recheck: Duration) -> Self {
        Self {
            probe,
            recheck,
            last: Cell::new(None),
            stats: ConnectionStats::default(),
        }
    }

    /// Number of `reconnect` calls that found the link back up
    pub fn reconnections(&self) -> u32 {
        self.stats.reconnections
    }

    /// Reconnection count and the last link failure
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    fn refresh(&self) -> bool {
        let up = self.probe.probe();
        self.last.set(Some((Instant::now(), up)));
        up
    }
}

impl<P: Probe> Connectivity for ProbeConnectivity<P> {
    fn is_connected(&self) -> bool {
        match self.last.get() {
            Some((at, up)) if at.elapsed() < self.recheck => up,
            _ => self.refresh(),
        }
    }

    fn reconnect(&mut self) {
        if self.refresh() {
            self.stats.record_reconnection();
            log::info!("Link restored");
        } else {
            self.stats.last_error = Some("link still down".into());
            log::warn!("Link still down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    struct Scripted {
        answers: Cell<u32>,
        calls: Cell<u32>,
    }

    impl Scripted {
        /// Bit `n` of `answers` is the result of probe `n`
        fn new(answers: u32) -> Self {
            Self {
                answers: Cell::new(answers),
                calls: Cell::new(0),
            }
        }
    }

    impl Probe for Scripted {
        fn probe(&self) -> bool {
            let n = self.calls.get();
            self.calls.set(n + 1);
            (self.answers.get() >> n) & 1 == 1
        }
    }

    #[test]
    fn test_answer_is_cached() {
        let link = ProbeConnectivity::new(Scripted::new(0b1), Duration::from_secs(60));

        assert!(link.is_connected());
        assert!(link.is_connected());
        assert_eq!(link.probe.calls.get(), 1);
    }

    #[test]
    fn test_zero_recheck_probes_every_time() {
        let link = ProbeConnectivity::new(Scripted::new(0b01), Duration::ZERO);

        assert!(link.is_connected());
        assert!(!link.is_connected());
        assert_eq!(link.probe.calls.get(), 2);
    }

    #[test]
    fn test_reconnect_forces_probe() {
        let mut link = ProbeConnectivity::new(Scripted::new(0b10), Duration::from_secs(60));

        assert!(!link.is_connected());
        link.reconnect();
        assert!(link.is_connected());
        assert_eq!(link.reconnections(), 1);
        assert_eq!(link.stats().reconnections, 1);
        assert!(link.stats().last_error.is_none());
    }

    #[test]
    fn test_failed_reconnect_not_counted() {
        let mut link = ProbeConnectivity::new(Scripted::new(0), Duration::from_secs(60));
        link.reconnect();
        assert_eq!(link.reconnections(), 0);
        assert_eq!(link.stats().last_error.as_deref(), Some("link still down"));
        assert!(!link.is_connected());
    }

    #[test]
    fn test_tcp_probe_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(probe.probe());

        drop(listener);
        let unresolvable = TcpProbe::new("host.invalid", 443, Duration::from_millis(100));
        assert!(!unresolvable.probe());
    }
}
