use crate::Snowflake;
use crate::error::{BoxDynError, Error};
use crate::snowflake::{Internals, MAX_WORKER_TAG, SharedSnowflake};
use crate::time::{SystemClock, TimeSource, default_epoch};
use chrono::prelude::*;
use std::sync::{Arc, Mutex};

#[cfg(feature = "ip-fallback")]
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Where the worker tag comes from.
enum WorkerTagSource<'a> {
    Value(u16),
    Provider(&'a dyn Fn() -> Result<u16, BoxDynError>),
}

/// A builder for building the ['Snowflake'] generator.
///
/// [`Snowflake`]: struct.Snowflake.html
pub struct Builder<'a, T = SystemClock> {
    start_time: Option<DateTime<Utc>>,
    worker_tag: Option<WorkerTagSource<'a>>,
    check_worker_tag: Option<&'a dyn Fn(u16) -> bool>,
    clock: T,
}

impl<'a> Default for Builder<'a> {
    fn default() -> Self {
        Builder::new()
    }
}

impl<'a> Builder<'a> {
    /// Construct a new builder for the build of ['Snowflake'].
    ///
    /// [`Snowflake`]: struct.Snowflake.html
    pub fn new() -> Self {
        Self {
            start_time: None,
            worker_tag: None,
            check_worker_tag: None,
            clock: SystemClock,
        }
    }
}

impl<'a, T: TimeSource> Builder<'a, T> {
    /// Set the start time (the epoch ids count milliseconds from).
    /// If the time is set later than the current time, 'finalize' will fail.
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set the worker tag explicitly.
    /// If it does not fit in 10 bits, 'finalize' will fail.
    pub fn worker_tag(mut self, worker_tag: u16) -> Self {
        self.worker_tag = Some(WorkerTagSource::Value(worker_tag));
        self
    }

    /// Set a provider for the worker tag, e.g. a lookup in the process
    /// configuration.
    /// If the provided closure returns an error, 'finalize' will fail.
    pub fn worker_tag_fn(mut self, worker_tag: &'a dyn Fn() -> Result<u16, BoxDynError>) -> Self {
        self.worker_tag = Some(WorkerTagSource::Provider(worker_tag));
        self
    }

    /// Set up a function to check the worker tag.
    /// If the function returns 'false', 'finalize' will fail.
    pub fn check_worker_tag(mut self, check_worker_tag: &'a dyn Fn(u16) -> bool) -> Self {
        self.check_worker_tag = Some(check_worker_tag);
        self
    }

    /// Replace the clock the generator reads time from.
    pub fn clock<C: TimeSource>(self, clock: C) -> Builder<'a, C> {
        Builder {
            start_time: self.start_time,
            worker_tag: self.worker_tag,
            check_worker_tag: self.check_worker_tag,
            clock,
        }
    }

    /// Finish building and create a Snowflake instance.
    ///
    /// When no worker tag was configured, one is derived from the host's
    /// private ip address (feature `ip-fallback`). Hosts sharing the low bits
    /// of their address get the same tag, so set explicit tags wherever
    /// instances must never collide.
    pub fn finalize(self) -> Result<Snowflake<T>, Error> {
        let start_time = self.start_time.unwrap_or_else(default_epoch);
        if start_time.timestamp_millis() > self.clock.current_millis() {
            return Err(Error::StartTimeAheadOfCurrentTime(start_time));
        }

        let (worker_tag, origin) = match self.worker_tag {
            Some(WorkerTagSource::Value(worker_tag)) => (worker_tag, "explicit"),
            Some(WorkerTagSource::Provider(worker_tag_fn)) => {
                (worker_tag_fn().map_err(Error::WorkerTagFailed)?, "provider")
            }
            None => (default_worker_tag()?, "host address"),
        };

        if worker_tag > MAX_WORKER_TAG {
            return Err(Error::InvalidWorkerTag {
                tag: worker_tag,
                max: MAX_WORKER_TAG,
            });
        }

        if let Some(check_worker_tag) = self.check_worker_tag {
            if !check_worker_tag(worker_tag) {
                return Err(Error::CheckWorkerTagFailed);
            }
        }

        tracing::debug!(worker_tag, origin, %start_time, "snowflake generator ready");

        let shared = Arc::new(SharedSnowflake {
            start_time: start_time.timestamp_millis(),
            worker_tag,
            clock: self.clock,
            internals: Mutex::new(Internals {
                elapsed_time: -1,
                sequence: 0,
            }),
        });
        Ok(Snowflake::new_inner(shared))
    }
}

#[cfg(feature = "ip-fallback")]
fn default_worker_tag() -> Result<u16, Error> {
    host_worker_tag().ok_or(Error::NoPrivateAddress)
}

#[cfg(not(feature = "ip-fallback"))]
fn default_worker_tag() -> Result<u16, Error> {
    Err(Error::WorkerTagFailed(
        "worker tag not provided and `ip-fallback` feature is disabled".into(),
    ))
}

/// Derive a worker tag from the first private address of an active, non
/// loopback interface. IPv4 is preferred over IPv6.
#[cfg(feature = "ip-fallback")]
fn host_worker_tag() -> Option<u16> {
    let addrs: Vec<IpAddr> = pnet_datalink::interfaces()
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
        .flat_map(|iface| iface.ips.iter().map(|network| network.ip()))
        .collect();

    let ipv4 = addrs.iter().find_map(|ip| match ip {
        IpAddr::V4(ipv4) if is_private_ipv4(ipv4) => Some(*ipv4),
        _ => None,
    });
    if let Some(ipv4) = ipv4 {
        return Some(worker_tag_from_ipv4(&ipv4));
    }

    addrs.iter().find_map(|ip| match ip {
        IpAddr::V6(ipv6) if is_private_ipv6(ipv6) => Some(worker_tag_from_ipv6(ipv6)),
        _ => None,
    })
}

/// The low 10 bits of the last two octets.
#[cfg(feature = "ip-fallback")]
pub(crate) fn worker_tag_from_ipv4(ip: &Ipv4Addr) -> u16 {
    let octets = ip.octets();
    u16::from_be_bytes([octets[2], octets[3]]) & MAX_WORKER_TAG
}

/// The low 10 bits of the last segment.
#[cfg(feature = "ip-fallback")]
pub(crate) fn worker_tag_from_ipv6(ip: &Ipv6Addr) -> u16 {
    ip.segments()[7] & MAX_WORKER_TAG
}

#[cfg(feature = "ip-fallback")]
pub(crate) fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    let octets = ip.octets();
    matches!(octets[0], 10)
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
}

#[cfg(feature = "ip-fallback")]
pub(crate) fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    // fc00::/7 (Unique Local Address)
    // fe80::/10 (Link-Local Address)
    (ip.segments()[0] & 0xfe00) == 0xfc00 || (ip.segments()[0] & 0xffc0) == 0xfe80
}
