use super::PlayerId;

/// Lifecycle notifications emitted by the registry for UI observers
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// A handle was installed under an id
    Registered(PlayerId),

    /// A live handle was replaced by a newer registration and detached
    Superseded(PlayerId),

    /// An id was removed from the registry
    Unregistered(PlayerId),

    /// A disposal failed; the native handle may have leaked
    DisposalFailed(PlayerId),

    /// A stuck player was reset successfully
    Recovered(PlayerId),

    /// A recovery attempt failed or was refused by the cap
    RecoveryFailed(PlayerId),

    /// The active navigation tab changed
    TabChanged {
        /// Previously active tab
        from: String,
        /// Newly active tab
        to: String,
    },
}
