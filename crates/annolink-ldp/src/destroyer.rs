//! Delete annotations from the LDP server

use crate::call::CallContext;
use crate::creator::PartialCreateError;
use crate::transport::LdpTransport;
use crate::LdpResult;
use tracing::{info, warn};

/// Removes stored annotations
pub struct LdpDestroyer<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: LdpTransport + ?Sized> LdpDestroyer<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// DELETE the root resource; the server removes the containers below it
    pub async fn destroy(&self, id: &str, cx: &CallContext) -> LdpResult<()> {
        self.transport.delete(id, cx).await?;
        info!("Destroyed annotation {}", id);
        Ok(())
    }

    /// Remove whatever a failed create left behind. Resources already gone
    /// are not an error.
    pub async fn cleanup(&self, failed: &PartialCreateError, cx: &CallContext) -> LdpResult<()> {
        let Some(root_id) = failed.root_id() else {
            return Ok(());
        };
        match self.destroy(root_id, cx).await {
            Err(e) if e.is_not_found() => {
                warn!("Partial annotation {} was already removed", root_id);
                Ok(())
            }
            other => other,
        }
    }
}
