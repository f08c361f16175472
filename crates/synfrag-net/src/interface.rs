//! Local interface hardware-address resolution

use pnet::datalink;
use pnet::util::MacAddr;
use synfrag_core::{Error, Result};

/// Resolve the MAC address of a local interface by name.
pub fn mac_of(interface: &str) -> Result<MacAddr> {
    let iface = datalink::interfaces()
        .into_iter()
        .find(|i| i.name == interface)
        .ok_or_else(|| Error::Interface(format!("interface not found: {}", interface)))?;

    let mac = iface
        .mac
        .filter(|m| *m != MacAddr::zero())
        .ok_or_else(|| Error::Interface(format!("interface {} has no MAC address", interface)))?;

    tracing::debug!(interface, %mac, "resolved interface MAC");
    Ok(mac)
}
