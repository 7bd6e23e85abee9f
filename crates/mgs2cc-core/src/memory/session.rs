//! Attachment to a target process.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use super::{Accessor, AddressTable, Addresses, PointerWidth, ProcessMemory};
use crate::error::{Error, Result};

/// A target plus the chains compiled for it. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    pub memory: Accessor,
    pub addresses: Arc<Addresses>,
}

/// Holds the current attachment, if any.
///
/// Attach and detach may happen at any time from the supervising thread;
/// effect threads take a [`Session`] snapshot per access through
/// [`Connector::session`], so after `detach()` every later access fails with
/// `Error::Detached`.
#[derive(Default)]
pub struct Connector {
    attached: RwLock<Option<Session>>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `table` and attach to `process`.
    ///
    /// Every module the chains are rooted at must currently resolve;
    /// otherwise nothing is attached and the lookup error is returned.
    pub fn attach(
        &self,
        process: Arc<dyn ProcessMemory>,
        table: &AddressTable,
        width: PointerWidth,
    ) -> Result<()> {
        let addresses = table.compile(width)?;
        let memory = Accessor::new(process);

        for module in addresses.modules() {
            let base = memory.module_base(module)?;
            info!("Module {} loaded at {:#x}", module, base);
        }

        let session = Session {
            memory,
            addresses: Arc::new(addresses),
        };
        let previous = self
            .attached
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(session);
        if previous.is_some() {
            warn!("Replaced an existing attachment");
        }
        Ok(())
    }

    /// Drop the attachment. Later accesses fail with `Error::Detached`.
    pub fn detach(&self) {
        let previous = self
            .attached
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!("Detached from target process");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn session(&self) -> Result<Session> {
        self.attached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::Detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockProcess;
    use crate::memory::layout::MODULE_NAME;

    fn process() -> Arc<MockProcess> {
        Arc::new(
            MockProcess::builder()
                .module(MODULE_NAME, 0x40_0000)
                .region(0x40_0000, 0x100)
                .build(),
        )
    }

    #[test]
    fn test_attach_and_detach() {
        let connector = Connector::new();
        assert!(!connector.is_attached());
        assert!(matches!(connector.session(), Err(Error::Detached)));

        connector
            .attach(process(), &AddressTable::default(), PointerWidth::Eight)
            .unwrap();
        assert!(connector.is_attached());
        let session = connector.session().unwrap();
        assert_eq!(
            session.memory.resolve(&session.addresses.pause_state).unwrap(),
            0x40_0000 + 0x17DBC7C
        );

        connector.detach();
        assert!(!connector.is_attached());
        assert!(matches!(connector.session(), Err(Error::Detached)));
    }

    #[test]
    fn test_attach_requires_module() {
        let connector = Connector::new();
        let empty = Arc::new(MockProcess::builder().build());
        let result = connector.attach(empty, &AddressTable::default(), PointerWidth::Eight);
        assert!(matches!(result, Err(Error::ModuleNotFound(_))));
        assert!(!connector.is_attached());
    }

    #[test]
    fn test_attach_rejects_malformed_table() {
        let connector = Connector::new();
        let table = AddressTable {
            location: "not a chain".to_string(),
            ..Default::default()
        };
        assert!(connector.attach(process(), &table, PointerWidth::Eight).is_err());
        assert!(!connector.is_attached());
    }
}
