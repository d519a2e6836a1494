//! The SystemInfo session object: distribution version, CPU, memory,
//! word size and fixed disk capacity, gathered once at start.

mod disk;
mod service;
mod sources;

pub use disk::*;
pub use service::*;
pub use sources::*;

use tracing::{error, info, warn, Span};

use crate::config::SystemInfoConfig;
use crate::error::Result;
use crate::keyfile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFacts {
    pub version: String,
    pub processor: String,
    /// Bytes
    pub memory_cap: u64,
    pub system_type: SystemType,
    /// Bytes, fixed drives only
    pub disk_cap: u64,
}

impl SystemFacts {
    /// Gather all facts in order; any failure means nothing gets published
    pub fn collect(
        config: &SystemInfoConfig,
        topology: &dyn Topology,
        languages: &[String],
    ) -> Result<Self> {
        let version = match version_from_deepin(&config.deepin_version, languages) {
            Ok(v) => v,
            Err(e) => {
                warn!("Get version from deepin failed: {}", e);
                version_from_lsb(&config.lsb_release)?
            }
        };

        let processor = processor(&config.cpuinfo)?;
        let memory_cap = memory_cap(&config.meminfo)?;
        let system_type = system_type(&config.uname_command)?;
        let disk_cap = topology.snapshot()?.disk_capacity()?;

        Ok(Self {
            version,
            processor,
            memory_cap,
            system_type,
            disk_cap,
        })
    }
}

struct Published {
    facts: SystemFacts,
    span: Span,
}

/// Owns the single published instance between `start` and `stop`
pub struct SystemInfoDaemon<T, B> {
    config: SystemInfoConfig,
    topology: T,
    bus: B,
    published: Option<Published>,
}

impl<T: Topology, B: FactsBus> SystemInfoDaemon<T, B> {
    pub fn new(config: SystemInfoConfig, topology: T, bus: B) -> Self {
        Self {
            config,
            topology,
            bus,
            published: None,
        }
    }

    /// Collect and publish. No-op when already started.
    pub fn start(&mut self) {
        if self.published.is_some() {
            return;
        }

        let span = tracing::info_span!("system_info");
        let published = span.in_scope(|| {
            let facts =
                match SystemFacts::collect(&self.config, &self.topology, &keyfile::language_names()) {
                    Ok(facts) => facts,
                    Err(e) => {
                        error!("{}", e);
                        return None;
                    }
                };

            if let Err(e) = self.bus.install(&facts) {
                error!("{}", e);
                return None;
            }

            info!(
                version = %facts.version,
                processor = %facts.processor,
                memory_cap = facts.memory_cap,
                disk_cap = facts.disk_cap,
                system_type = facts.system_type.as_i64(),
                "Published system info"
            );
            Some(facts)
        });

        self.published = published.map(|facts| Published { facts, span });
    }

    /// Withdraw the object. No-op when not started.
    pub fn stop(&mut self) {
        let Some(published) = self.published.take() else {
            return;
        };

        published.span.in_scope(|| {
            if let Err(e) = self.bus.uninstall() {
                warn!("{}", e);
            }
        });
    }

    pub fn is_started(&self) -> bool {
        self.published.is_some()
    }

    pub fn facts(&self) -> Option<&SystemFacts> {
        self.published.as_ref().map(|p| &p.facts)
    }
}
