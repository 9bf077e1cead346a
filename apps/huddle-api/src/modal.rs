//! Modal dialog state for the client shell.
//!
//! One [`ModalStore`] is created per session and handed to whatever renders dialogs.
//! Renderers subscribe and react to changes; call sites open and close dialogs.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::channel::{Channel, ChannelType};
use crate::models::server::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModalKind {
    CreateServer,
    Invite,
    EditServer,
    Members,
    CreateChannel,
    LeaveServer,
    DeleteServer,
    DeleteChannel,
    EditChannel,
}

/// Entities the open dialog operates on. Which fields are set depends on the call site.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<ChannelType>,
}

impl ModalData {
    pub fn server(server: Server) -> Self {
        Self {
            server: Some(server),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    #[serde(rename = "type")]
    pub kind: Option<ModalKind>,
    pub is_open: bool,
    pub data: ModalData,
}

pub struct ModalStore {
    state: watch::Sender<ModalState>,
}

impl ModalStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ModalState::default());
        Self { state }
    }

    pub fn open(&self, kind: ModalKind, data: ModalData) {
        self.state.send_replace(ModalState {
            kind: Some(kind),
            is_open: true,
            data,
        });
    }

    /// Back to the closed state, dropping any payload.
    pub fn close(&self) {
        self.state.send_replace(ModalState::default());
    }

    pub fn snapshot(&self) -> ModalState {
        self.state.borrow().clone()
    }

    /// Whether the dialog for `kind` is the one showing.
    pub fn is_open_for(&self, kind: ModalKind) -> bool {
        let state = self.state.borrow();
        state.is_open && state.kind == Some(kind)
    }

    pub fn subscribe(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}
