//! Device poller.
//!
//! Fetches the account's networks, then each network's device list, applies
//! the configured filters, and produces a fresh [`ScanResult`] on every
//! poll. Results are never merged with a previous poll; the host owns any
//! snapshot it wants to keep.

mod filters;

pub use filters::ScanFilters;

use crate::api::Transport;
use crate::error::ApiError;
use crate::session::{SessionManager, SessionStorage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// How long the account/network list is reused before re-fetching. Networks
/// rarely change, and this bounds account-listing calls to one per hour per
/// process regardless of poll frequency.
pub const ACCOUNT_CACHE_EXPIRY: Duration = Duration::from_secs(3600);

/// The server reports a missing nickname either as null or as this literal
/// placeholder string.
const NICKNAME_PLACEHOLDER: &str = "None";

/// Account payload from `GET account`. Only the network list matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub networks: NetworkList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkList {
    pub data: Vec<NetworkRef>,
}

/// A network as returned by the account endpoint. The server identifies it
/// by a URL field; the numeric ID is embedded in the path.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRef {
    pub url: String,
}

/// A device record from `GET networks/{id}/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub wireless: bool,
    #[serde(default)]
    pub connected: bool,
    /// Opaque connection-source attributes blob, passed through as-is.
    #[serde(default)]
    pub source: Option<Value>,
}

impl Device {
    /// The user-assigned nickname, falling back to the hostname when the
    /// nickname is absent, empty, or the literal placeholder.
    pub fn display_name(&self) -> Option<&str> {
        match self.nickname.as_deref() {
            Some(n) if !n.is_empty() && n != NICKNAME_PLACEHOLDER => Some(n),
            _ => self.hostname.as_deref().filter(|h| !h.is_empty()),
        }
    }
}

/// One poll's worth of presence data. Entirely replaced on each poll.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// MAC addresses of devices matching all active filters.
    pub macs: Vec<String>,
    /// MAC address to display name, for devices that have one.
    pub names: HashMap<String, String>,
    /// MAC address to connection-source attributes, where present.
    pub attrs: HashMap<String, Value>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ScanResult {
    pub fn empty() -> Self {
        Self {
            macs: Vec::new(),
            names: HashMap::new(),
            attrs: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.macs.is_empty()
    }
}

/// Extract the numeric network ID from the server's inconsistent ID
/// representation: either a bare number or a URL ending in `/{id}`.
pub fn network_id_from_url(id_or_url: &str) -> Option<u64> {
    if !id_or_url.is_empty() && id_or_url.bytes().all(|b| b.is_ascii_digit()) {
        return id_or_url.parse().ok();
    }
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = ID_RE.get_or_init(|| Regex::new(r"/(\d+)$").expect("static network-id regex"));
    re.captures(id_or_url)?.get(1)?.as_str().parse().ok()
}

/// What the poller needs from the API: session presence, the account's
/// network list, and per-network device lists. `SessionManager` implements
/// this over the live API; tests substitute a fake.
pub trait EeroApi {
    fn has_session(&self) -> bool;
    fn account(&mut self) -> Result<Account, ApiError>;
    fn devices(&mut self, network_id: u64) -> Result<Vec<Device>, ApiError>;
}

impl<S: SessionStorage, T: Transport> EeroApi for SessionManager<S, T> {
    fn has_session(&self) -> bool {
        self.current_token().is_some()
    }

    fn account(&mut self) -> Result<Account, ApiError> {
        let data = self.with_session(|t, cookie| t.get("account", Some(cookie)))?;
        Ok(serde_json::from_value(data)?)
    }

    fn devices(&mut self, network_id: u64) -> Result<Vec<Device>, ApiError> {
        let action = format!("networks/{}/devices", network_id);
        let data = self.with_session(|t, cookie| t.get(&action, Some(cookie)))?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Polls the eero cloud for currently-present devices.
pub struct DeviceTracker<A: EeroApi> {
    api: A,
    filters: ScanFilters,
    account_cache: Option<CachedAccount>,
    cache_expiry: Duration,
}

struct CachedAccount {
    fetched_at: Instant,
    account: Account,
}

impl<A: EeroApi> DeviceTracker<A> {
    pub fn new(api: A, filters: ScanFilters) -> Self {
        Self {
            api,
            filters,
            account_cache: None,
            cache_expiry: ACCOUNT_CACHE_EXPIRY,
        }
    }

    /// Whether a session token is available for polling.
    pub fn has_session(&self) -> bool {
        self.api.has_session()
    }

    /// Run one poll and return the devices currently matching all filters.
    ///
    /// Without a session token this returns an empty result and issues no
    /// network calls: an unauthenticated tracker is soft-disabled, not
    /// broken.
    pub fn poll(&mut self) -> Result<ScanResult, ApiError> {
        if !self.api.has_session() {
            tracing::debug!("No session token; returning empty scan result");
            return Ok(ScanResult::empty());
        }

        let account = self.cached_account()?;
        let mut result = ScanResult::empty();

        for network in &account.networks.data {
            let Some(network_id) = network_id_from_url(&network.url) else {
                tracing::warn!("Could not extract network ID from '{}'; skipping", network.url);
                continue;
            };

            if !self.filters.allows_network(network_id) {
                tracing::debug!("Ignoring network {}: not in only_networks", network_id);
                continue;
            }

            let devices = self.api.devices(network_id)?;
            self.collect_devices(network_id, &devices, &mut result);
        }

        tracing::debug!("Poll complete: {} devices present", result.macs.len());
        Ok(result)
    }

    fn collect_devices(&self, network_id: u64, devices: &[Device], result: &mut ScanResult) {
        for device in devices {
            if !self.filters.allows_device(device) {
                continue;
            }

            if let Some(name) = device.display_name() {
                result.names.insert(device.mac.clone(), name.to_string());
            }
            if let Some(attrs) = &device.source {
                result.attrs.insert(device.mac.clone(), attrs.clone());
            }

            tracing::debug!(
                "Network {} device found: name={:?} host={:?} mac={}",
                network_id,
                device.nickname,
                device.hostname,
                device.mac
            );
            result.macs.push(device.mac.clone());
        }
    }

    fn cached_account(&mut self) -> Result<Account, ApiError> {
        if let Some(cached) = &self.account_cache {
            if cached.fetched_at.elapsed() < self.cache_expiry {
                return Ok(cached.account.clone());
            }
        }

        tracing::debug!(
            "Updating account cache (expires every {} seconds)",
            self.cache_expiry.as_secs()
        );
        let account = self.api.account()?;
        self.account_cache = Some(CachedAccount {
            fetched_at: Instant::now(),
            account: account.clone(),
        });
        Ok(account)
    }

    #[cfg(test)]
    fn set_cache_expiry(&mut self, expiry: Duration) {
        self.cache_expiry = expiry;
    }
}
