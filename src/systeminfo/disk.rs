//! Fixed disk capacity from the UDisks2 object graph.
//!
//! Several Block objects (partitions, LVs) point at the same Drive, so the
//! drive set is deduplicated before sizes are summed. Removable drives are
//! left out.

use std::collections::{BTreeMap, HashMap, HashSet};

use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::error::{Error, Result};

pub const BLOCK_INTERFACE: &str = "org.freedesktop.UDisks2.Block";
pub const DRIVE_INTERFACE: &str = "org.freedesktop.UDisks2.Drive";
const OBJECT_MANAGER_INTERFACE: &str = "org.freedesktop.DBus.ObjectManager";

/// `Block.Drive` of a block device that belongs to no drive
pub const NO_DRIVE: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    ObjectPath(String),
    Bool(bool),
    U64(u64),
    Other,
}

impl From<&Value<'_>> for PropertyValue {
    fn from(value: &Value<'_>) -> Self {
        match value {
            Value::ObjectPath(p) => PropertyValue::ObjectPath(p.to_string()),
            Value::Bool(b) => PropertyValue::Bool(*b),
            Value::U64(n) => PropertyValue::U64(*n),
            _ => PropertyValue::Other,
        }
    }
}

pub type Properties = HashMap<String, PropertyValue>;

/// Managed objects keyed by path, then interface name
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    objects: BTreeMap<String, HashMap<String, Properties>>,
}

impl TopologySnapshot {
    pub fn insert(&mut self, path: &str, interface: &str, properties: Properties) {
        self.objects
            .entry(path.to_string())
            .or_default()
            .insert(interface.to_string(), properties);
    }

    pub fn interface(&self, path: &str, interface: &str) -> Option<&Properties> {
        self.objects.get(path)?.get(interface)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Distinct drives referenced by Block objects, in first-seen order
    pub fn drive_paths(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut drives = Vec::new();

        for (path, interfaces) in &self.objects {
            let Some(block) = interfaces.get(BLOCK_INTERFACE) else {
                continue;
            };
            let drive = match block.get("Drive") {
                Some(PropertyValue::ObjectPath(p)) => p,
                Some(_) => return Err(Error::parse(format!("{path} Block.Drive"), "not an object path")),
                None => return Err(Error::not_found(format!("{path} Block.Drive"))),
            };
            if drive != NO_DRIVE && seen.insert(drive.clone()) {
                drives.push(drive.clone());
            }
        }

        Ok(drives)
    }

    /// Sum of `Drive.Size` over distinct non-removable drives
    pub fn disk_capacity(&self) -> Result<u64> {
        let mut total = 0u64;

        for drive in self.drive_paths()? {
            let Some(props) = self.interface(&drive, DRIVE_INTERFACE) else {
                tracing::debug!(drive = %drive, "Block refers to an object without a Drive interface");
                continue;
            };

            let removable = match props.get("Removable") {
                Some(PropertyValue::Bool(b)) => *b,
                Some(_) => return Err(Error::parse(format!("{drive} Drive.Removable"), "not a boolean")),
                None => return Err(Error::not_found(format!("{drive} Drive.Removable"))),
            };
            if removable {
                continue;
            }

            let size = match props.get("Size") {
                Some(PropertyValue::U64(n)) => *n,
                Some(_) => return Err(Error::parse(format!("{drive} Drive.Size"), "not a uint64")),
                None => return Err(Error::not_found(format!("{drive} Drive.Size"))),
            };
            tracing::debug!(drive = %drive, size, "Counting fixed drive");
            total = total.saturating_add(size);
        }

        Ok(total)
    }
}

/// Source of hardware-topology snapshots
pub trait Topology {
    fn snapshot(&self) -> Result<TopologySnapshot>;
}

impl Topology for TopologySnapshot {
    fn snapshot(&self) -> Result<TopologySnapshot> {
        Ok(self.clone())
    }
}

type ManagedObjects = HashMap<OwnedObjectPath, HashMap<String, HashMap<String, OwnedValue>>>;

/// UDisks2 daemon reached through its ObjectManager
pub struct UDisks2 {
    conn: Connection,
    destination: String,
    path: String,
}

impl UDisks2 {
    pub fn new(conn: Connection, destination: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            conn,
            destination: destination.into(),
            path: path.into(),
        }
    }

    fn object_manager(&self) -> Result<Proxy<'_>> {
        Ok(Proxy::new(
            &self.conn,
            self.destination.as_str(),
            self.path.as_str(),
            OBJECT_MANAGER_INTERFACE,
        )?)
    }
}

impl Topology for UDisks2 {
    fn snapshot(&self) -> Result<TopologySnapshot> {
        let objects: ManagedObjects = self.object_manager()?.call("GetManagedObjects", &())?;

        let mut snapshot = TopologySnapshot::default();
        for (path, interfaces) in objects {
            for (interface, props) in interfaces {
                let props = props
                    .iter()
                    .map(|(name, value)| (name.clone(), PropertyValue::from(&**value)))
                    .collect();
                snapshot.insert(path.as_str(), &interface, props);
            }
        }

        tracing::debug!(objects = snapshot.len(), "Fetched UDisks2 managed objects");
        Ok(snapshot)
    }
}
