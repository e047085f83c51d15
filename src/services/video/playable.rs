use std::{future::Future, panic::AssertUnwindSafe};

use async_trait::async_trait;
use futures::FutureExt;

use super::{Capabilities, PlayerError};

/// Capability-checked contract of a native video player handle.
///
/// Every operation is optional. Implementors declare what they support in
/// [`Playable::capabilities`]; the registry never calls an operation whose
/// flag is missing. The default bodies report [`PlayerError::Unsupported`]
/// so an implementor only writes the operations it actually has.
#[async_trait]
pub trait Playable: Send + Sync {
    /// Operations this handle supports.
    fn capabilities(&self) -> Capabilities;

    /// Start or continue playback.
    async fn play(&self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("play"))
    }

    /// Pause playback.
    async fn pause(&self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("pause"))
    }

    /// Mute or unmute audio.
    async fn set_muted(&self, _muted: bool) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("set_muted"))
    }

    /// Reset the native pipeline, used to recover a stuck player.
    async fn reset(&self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("reset"))
    }

    /// Release native resources. The handle is unusable afterwards.
    async fn release(&self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("release"))
    }
}

/// Runs a native call, turning a panic inside the handle into an error.
async fn guarded<F>(operation: &'static str, call: F) -> Result<(), PlayerError>
where
    F: Future<Output = Result<(), PlayerError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(PlayerError::Other(format!("{operation} panicked"))),
    }
}

/// Invokes `pause()` if supported.
pub(crate) async fn pause_if_supported(
    handle: &dyn Playable,
    capabilities: Capabilities,
) -> Result<(), PlayerError> {
    if capabilities.contains(Capabilities::PAUSE) {
        guarded("pause", handle.pause()).await?;
    }
    Ok(())
}

/// Invokes `play()` if supported.
pub(crate) async fn play_if_supported(
    handle: &dyn Playable,
    capabilities: Capabilities,
) -> Result<(), PlayerError> {
    if capabilities.contains(Capabilities::PLAY) {
        guarded("play", handle.play()).await?;
    }
    Ok(())
}

/// Invokes `set_muted()` if supported.
pub(crate) async fn set_muted_if_supported(
    handle: &dyn Playable,
    capabilities: Capabilities,
    muted: bool,
) -> Result<(), PlayerError> {
    if capabilities.contains(Capabilities::SET_MUTED) {
        guarded("set_muted", handle.set_muted(muted)).await?;
    }
    Ok(())
}

/// Invokes `reset()` if supported. Returns whether a call was made.
pub(crate) async fn reset_if_supported(
    handle: &dyn Playable,
    capabilities: Capabilities,
) -> Result<bool, PlayerError> {
    if capabilities.contains(Capabilities::RESET) {
        guarded("reset", handle.reset()).await?;
        return Ok(true);
    }
    Ok(false)
}

/// Releases native resources, falling back to `reset()` for handles that
/// cannot release.
pub(crate) async fn release_if_supported(
    handle: &dyn Playable,
    capabilities: Capabilities,
) -> Result<(), PlayerError> {
    if capabilities.contains(Capabilities::RELEASE) {
        guarded("release", handle.release()).await
    } else {
        reset_if_supported(handle, capabilities).await.map(|_| ())
    }
}
