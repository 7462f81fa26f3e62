pub mod disconnect_tests;
pub mod join_tests;
pub mod relay_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use meshtalk_server::{Relay, RelayCommand};

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_relay() -> (mpsc::Sender<RelayCommand>, MockSignalingOutput) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RelayCommand>(100);
    let mock = MockSignalingOutput::new();

    let relay = Relay::new(cmd_rx, Arc::new(mock.clone()));
    tokio::spawn(relay.run());

    (cmd_tx, mock)
}
