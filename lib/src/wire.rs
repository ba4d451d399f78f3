//! Implements a default packet Sender using pnet

use pnet::datalink;
use std::sync::{Arc, Mutex};

use crate::{
    error::{ReplayLibError, Result},
    network::NetworkInterface,
    packet::Sender,
};

/// Shared handle to the sender replayed packets are written to
pub type Wire = Arc<Mutex<dyn Sender>>;

/// A PNetSender implementation of packet Sender
pub struct PNetSender {
    sender: Box<dyn datalink::DataLinkSender>,
}

// Implements the Sender trait for our PNet implementation
impl Sender for PNetSender {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let opt = self.sender.send_to(packet, None);
        match opt {
            Some(res) => {
                Ok(res.map_err(|e| ReplayLibError::Wire(e.to_string()))?)
            }
            None => Err(ReplayLibError::Wire("failed to send packet".into())),
        }
    }
}

// DataLinkSender is only ever used behind the Wire mutex
unsafe impl Sync for PNetSender {}

/// Returns the default wire for the given interface
///
/// Example
/// ```no_run
/// # use r_replaylib::network;
/// # use r_replaylib::wire;
/// let interface = network::get_default_interface().unwrap();
/// let packet_wire = wire::default(&interface).unwrap();
/// ```
pub fn default(interface: &NetworkInterface) -> Result<Wire> {
    let cfg = pnet::datalink::Config::default();

    let tx = match pnet::datalink::channel(interface, cfg) {
        Ok(pnet::datalink::Channel::Ethernet(tx, _)) => Ok(tx),
        Ok(_) => {
            Err(ReplayLibError::Wire("failed to create packet sender".into()))
        }
        Err(e) => Err(ReplayLibError::Wire(e.to_string())),
    }?;

    Ok(Arc::new(Mutex::new(PNetSender { sender: tx })))
}
