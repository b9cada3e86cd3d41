// src/infrastructure/permission.rs
use crate::config::PermissionPolicy;
use crate::domain::services::permission::PermissionGateway;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// Storage permission driven by the configured policy.
///
/// With `PermissionPolicy::Ask` a request is forwarded to whoever owns the
/// receiving end (the terminal loop), which answers through
/// [`PolicyPermissionGateway::record_answer`] and the presenter handle.
#[derive(Debug)]
pub struct PolicyPermissionGateway {
    granted: AtomicBool,
    can_request: AtomicBool,
    requests: mpsc::UnboundedSender<i32>,
}

impl PolicyPermissionGateway {
    pub fn new(policy: PermissionPolicy) -> (Self, mpsc::UnboundedReceiver<i32>) {
        let (requests, rx) = mpsc::unbounded_channel();
        let gateway = Self {
            granted: AtomicBool::new(policy == PermissionPolicy::Granted),
            can_request: AtomicBool::new(policy == PermissionPolicy::Ask),
            requests,
        };
        (gateway, rx)
    }

    /// A denial is final for the rest of the session
    pub fn record_answer(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
        if !granted {
            self.can_request.store(false, Ordering::SeqCst);
        }
    }
}

impl PermissionGateway for PolicyPermissionGateway {
    fn has_storage_write_permission(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn can_request_storage_write_permission(&self) -> bool {
        self.can_request.load(Ordering::SeqCst)
    }

    #[instrument(skip(self), level = "debug")]
    fn request_permission(&self, request_id: i32) {
        debug!("Forwarding permission request");
        if self.requests.send(request_id).is_err() {
            warn!(request_id, "Nobody is listening for permission requests");
        }
    }
}
