//! The overlay host: whatever actually draws the modal and owns the hardware back button.

use std::fmt;

use scrim_config::RegionIds;
use serde::Serialize;
use tracing::trace;

/// Back button handler. Returns `true` if it handled the press.
pub type BackHandler = Box<dyn FnMut() -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationToken(u64);

/// Where the host should put the modal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    /// Inside the embedding view, covering it.
    Inline,
    /// In a separate overlay window above everything.
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    pub layer: Layer,
    pub ids: RegionIds,
}

/// Host collaborator of a modal controller.
///
/// All methods are called from the commit context.
pub trait OverlayHost {
    fn mount(&mut self, request: &MountRequest);
    fn unmount(&mut self);
    fn register_back_handler(&mut self, handler: BackHandler) -> RegistrationToken;
    fn unregister_back_handler(&mut self, token: RegistrationToken);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Mount(MountRequest),
    Unmount,
    RegisterBackHandler(RegistrationToken),
    UnregisterBackHandler(RegistrationToken),
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Mount(request) => {
                let layer = match request.layer {
                    Layer::Inline => "inline",
                    Layer::Overlay => "overlay",
                };
                write!(
                    f,
                    "mount {layer} {}/{}/{}",
                    request.ids.container, request.ids.backdrop, request.ids.content
                )
            }
            HostEvent::Unmount => f.write_str("unmount"),
            HostEvent::RegisterBackHandler(token) => write!(f, "register-back {}", token.0),
            HostEvent::UnregisterBackHandler(token) => write!(f, "unregister-back {}", token.0),
        }
    }
}

/// Host that draws nothing and records what it was asked to do.
#[derive(Default)]
pub struct HeadlessHost {
    events: Vec<HostEvent>,
    mounted: Option<MountRequest>,
    back_handlers: Vec<(RegistrationToken, BackHandler)>,
    next_token: u64,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mounted(&self) -> Option<&MountRequest> {
        self.mounted.as_ref()
    }

    pub fn back_handler_count(&self) -> usize {
        self.back_handlers.len()
    }

    /// Simulates a hardware back press. The most recently registered handler goes first.
    ///
    /// Returns `true` if some handler handled the press.
    pub fn press_back(&mut self) -> bool {
        self.back_handlers
            .iter_mut()
            .rev()
            .any(|(_, handler)| handler())
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("events", &self.events)
            .field("mounted", &self.mounted)
            .field("back_handlers", &self.back_handlers.len())
            .finish()
    }
}

impl OverlayHost for HeadlessHost {
    fn mount(&mut self, request: &MountRequest) {
        trace!("mounting {request:?}");
        self.mounted = Some(request.clone());
        self.events.push(HostEvent::Mount(request.clone()));
    }

    fn unmount(&mut self) {
        self.mounted = None;
        self.events.push(HostEvent::Unmount);
    }

    fn register_back_handler(&mut self, handler: BackHandler) -> RegistrationToken {
        self.next_token += 1;
        let token = RegistrationToken(self.next_token);
        self.back_handlers.push((token, handler));
        self.events.push(HostEvent::RegisterBackHandler(token));
        token
    }

    fn unregister_back_handler(&mut self, token: RegistrationToken) {
        self.back_handlers.retain(|(t, _)| *t != token);
        self.events.push(HostEvent::UnregisterBackHandler(token));
    }
}
