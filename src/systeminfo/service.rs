use tracing::warn;
use zbus::blocking::Connection;
use zbus::interface;

use super::SystemFacts;
use crate::error::{Error, Result};

/// Read-only bus view of [`SystemFacts`]
pub struct SystemInfoObject {
    facts: SystemFacts,
}

impl SystemInfoObject {
    pub fn new(facts: SystemFacts) -> Self {
        Self { facts }
    }
}

#[interface(name = "com.deepin.daemon.SystemInfo")]
impl SystemInfoObject {
    #[zbus(property)]
    fn version(&self) -> String {
        self.facts.version.clone()
    }

    #[zbus(property)]
    fn processor(&self) -> String {
        self.facts.processor.clone()
    }

    #[zbus(property)]
    fn memory_cap(&self) -> u64 {
        self.facts.memory_cap
    }

    #[zbus(property)]
    fn disk_cap(&self) -> u64 {
        self.facts.disk_cap
    }

    #[zbus(property)]
    fn system_type(&self) -> i64 {
        self.facts.system_type.as_i64()
    }
}

/// Where collected facts get published
pub trait FactsBus {
    fn install(&self, facts: &SystemFacts) -> Result<()>;
    fn uninstall(&self) -> Result<()>;
}

/// Session bus export under a well-known name
pub struct SessionBus {
    conn: Connection,
    name: String,
    path: String,
}

impl SessionBus {
    pub fn new(conn: Connection, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
            path: path.into(),
        }
    }
}

impl FactsBus for SessionBus {
    fn install(&self, facts: &SystemFacts) -> Result<()> {
        let added = self
            .conn
            .object_server()
            .at(self.path.as_str(), SystemInfoObject::new(facts.clone()))?;
        if !added {
            return Err(Error::Bus(zbus::Error::Failure(format!(
                "{} is already exported",
                self.path
            ))));
        }

        if let Err(e) = self.conn.request_name(self.name.as_str()) {
            if let Err(undo) = self
                .conn
                .object_server()
                .remove::<SystemInfoObject, _>(self.path.as_str())
            {
                warn!(path = %self.path, "Unexport after failed name request: {}", undo);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Withdraws the object and the name; both are attempted, the first failure wins
    fn uninstall(&self) -> Result<()> {
        let removed = self
            .conn
            .object_server()
            .remove::<SystemInfoObject, _>(self.path.as_str());
        let released = self.conn.release_name(self.name.as_str());
        removed?;
        released?;
        Ok(())
    }
}
