//! Device and network filtering.
//!
//! All three predicates are independent and every active one must pass:
//! MAC allow-list, network allow-list, wireless-only. An empty allow-list
//! means no filtering on that axis.

use crate::tracker::Device;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ScanFilters {
    only_macs: HashSet<String>,
    only_networks: HashSet<u64>,
    only_wireless: bool,
}

impl ScanFilters {
    /// Build filters from the raw configuration values.
    ///
    /// `only_macs` is a comma-separated list; entries are trimmed and
    /// lowercased so matching is case-insensitive.
    pub fn new(only_macs: &str, only_networks: &[u64], only_wireless: bool) -> Self {
        let only_macs: HashSet<String> = only_macs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();
        if !only_macs.is_empty() {
            tracing::info!("Tracking only MAC addresses: {:?}", only_macs);
        }

        let only_networks: HashSet<u64> = only_networks.iter().copied().collect();
        if !only_networks.is_empty() {
            tracing::info!("Tracking only networks: {:?}", only_networks);
        }

        tracing::info!("Tracking only wireless devices = {}", only_wireless);

        Self {
            only_macs,
            only_networks,
            only_wireless,
        }
    }

    pub fn allows_network(&self, network_id: u64) -> bool {
        self.only_networks.is_empty() || self.only_networks.contains(&network_id)
    }

    pub fn allows_device(&self, device: &Device) -> bool {
        if !device.connected {
            return false;
        }
        if self.only_wireless && !device.wireless {
            return false;
        }
        if !self.only_macs.is_empty() && !self.only_macs.contains(&device.mac.to_lowercase()) {
            return false;
        }
        true
    }
}

impl Default for ScanFilters {
    /// No MAC or network filtering, wireless devices only.
    fn default() -> Self {
        Self {
            only_macs: HashSet::new(),
            only_networks: HashSet::new(),
            only_wireless: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Device;

    fn device(mac: &str, wireless: bool, connected: bool) -> Device {
        Device {
            mac: mac.to_string(),
            hostname: None,
            nickname: None,
            wireless,
            connected,
            source: None,
        }
    }

    #[test]
    fn test_mac_list_parsing() {
        let filters = ScanFilters::new(" AA:BB:CC:DD:EE:FF, 11:22:33:44:55:66 ,,", &[], false);
        assert!(filters.allows_device(&device("aa:bb:cc:dd:ee:ff", false, true)));
        assert!(filters.allows_device(&device("11:22:33:44:55:66", false, true)));
        assert!(!filters.allows_device(&device("de:ad:be:ef:00:00", false, true)));
    }

    #[test]
    fn test_mac_filter_case_insensitive() {
        let filters = ScanFilters::new("AA:BB:CC:DD:EE:FF", &[], false);
        assert!(filters.allows_device(&device("aa:bb:cc:dd:ee:ff", false, true)));
        assert!(filters.allows_device(&device("AA:BB:CC:DD:EE:FF", false, true)));
    }

    #[test]
    fn test_empty_mac_list_allows_all() {
        let filters = ScanFilters::new("", &[], false);
        assert!(filters.allows_device(&device("de:ad:be:ef:00:00", false, true)));
    }

    #[test]
    fn test_disconnected_never_allowed() {
        let filters = ScanFilters::new("", &[], false);
        assert!(!filters.allows_device(&device("de:ad:be:ef:00:00", true, false)));
    }

    #[test]
    fn test_wireless_only() {
        let filters = ScanFilters::default();
        assert!(filters.allows_device(&device("de:ad:be:ef:00:00", true, true)));
        assert!(!filters.allows_device(&device("de:ad:be:ef:00:00", false, true)));
    }

    #[test]
    fn test_network_allow_list() {
        let filters = ScanFilters::new("", &[1234], true);
        assert!(filters.allows_network(1234));
        assert!(!filters.allows_network(5678));

        let unfiltered = ScanFilters::default();
        assert!(unfiltered.allows_network(5678));
    }
}
