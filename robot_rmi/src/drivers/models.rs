/// Where the engine's link to the controller currently stands.
///
/// `Disconnected` is both the initial state and the state entered on any
/// read failure; the reconnect loop then moves through `Connecting` back
/// to `Connected`.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}
