//! One-time installation of the caption bridge

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Process-wide "already installed" flag
pub struct InstallGuard {
    installed: AtomicBool,
}

/// Guard for the bridge created by [`super::install_caption_hook`]
pub static CAPTION_HOOK: InstallGuard = InstallGuard::new();

impl InstallGuard {
    pub const fn new() -> Self {
        Self {
            installed: AtomicBool::new(false),
        }
    }

    /// Claim installation; only the first caller gets `true`
    pub fn try_install(&self) -> bool {
        let first = self
            .installed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !first {
            info!("Caption hook already installed");
        }
        first
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}

impl Default for InstallGuard {
    fn default() -> Self {
        Self::new()
    }
}
