use std::cell::RefCell;
use std::fs;
use std::path::Path;

use dde::config::SystemInfoConfig;
use dde::systeminfo::{
    FactsBus, Properties, PropertyValue, SystemFacts, SystemInfoDaemon, SystemType,
    TopologySnapshot, BLOCK_INTERFACE, DRIVE_INTERFACE,
};
use dde::Result;
use tempfile::{tempdir, TempDir};
use tracing::Level;

mod common;

use common::{at_level, capture_events};

#[derive(Default)]
struct Published {
    installs: RefCell<Vec<SystemFacts>>,
    uninstalls: RefCell<usize>,
}

impl FactsBus for &Published {
    fn install(&self, facts: &SystemFacts) -> Result<()> {
        self.installs.borrow_mut().push(facts.clone());
        Ok(())
    }

    fn uninstall(&self) -> Result<()> {
        *self.uninstalls.borrow_mut() += 1;
        Ok(())
    }
}

fn host() -> (TempDir, SystemInfoConfig) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join("cpuinfo"),
        "processor\t: 0\nmodel name\t: Intel Xeon\n\
         processor\t: 1\nmodel name\t: Intel Xeon\n\
         processor\t: 2\nmodel name\t: Intel Xeon\n\
         processor\t: 3\nmodel name\t: Intel Xeon\n",
    )
    .unwrap();
    fs::write(
        root.join("meminfo"),
        "MemTotal:  16384000 kB\nMemFree:    8000000 kB\n",
    )
    .unwrap();
    fs::write(root.join("lsb-release"), "DISTRIB_ID=Deepin\nDISTRIB_RELEASE=20.3\n").unwrap();

    let config = SystemInfoConfig {
        deepin_version: root.join("deepin-version"),
        lsb_release: root.join("lsb-release"),
        cpuinfo: root.join("cpuinfo"),
        meminfo: root.join("meminfo"),
        uname_command: vec!["/bin/sh".into(), "-c".into(), "printf 'x86_64\\n'".into()],
        ..SystemInfoConfig::default()
    };
    (dir, config)
}

fn block(s: &mut TopologySnapshot, path: &str, drive: &str) {
    s.insert(
        path,
        BLOCK_INTERFACE,
        Properties::from([("Drive".into(), PropertyValue::ObjectPath(drive.into()))]),
    );
}

fn drive(s: &mut TopologySnapshot, path: &str, size: u64, removable: bool) {
    s.insert(
        path,
        DRIVE_INTERFACE,
        Properties::from([
            ("Size".into(), PropertyValue::U64(size)),
            ("Removable".into(), PropertyValue::Bool(removable)),
        ]),
    );
}

fn dedup_topology() -> TopologySnapshot {
    let mut s = TopologySnapshot::default();
    block(&mut s, "/b/a", "/d/X");
    block(&mut s, "/b/b", "/d/X");
    block(&mut s, "/b/c", "/d/Y");
    drive(&mut s, "/d/X", 500, false);
    drive(&mut s, "/d/Y", 1000, true);
    s
}

#[test]
fn reports_all_facts() {
    let (_dir, config) = host();
    let bus = Published::default();
    let mut daemon = SystemInfoDaemon::new(config, dedup_topology(), &bus);

    let ((), events) = capture_events(|| daemon.start());

    let warnings = at_level(&events, Level::WARN);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].starts_with("Get version from deepin failed"));
    assert!(at_level(&events, Level::ERROR).is_empty());

    let facts = daemon.facts().cloned().unwrap();
    assert_eq!(facts.memory_cap, 16_777_216_000);
    assert_eq!(facts.processor, "Intel Xeon x 4");
    assert_eq!(facts.system_type, SystemType::Bits64);
    assert_eq!(facts.disk_cap, 500);
    assert_eq!(facts.version, "20.3");
    assert_eq!(*bus.installs.borrow(), vec![facts]);
}

#[test]
fn uses_deepin_version_when_present() {
    let (dir, config) = host();
    fs::write(
        dir.path().join("deepin-version"),
        "[Release]\nVersion=20.3\nType=Desktop\n",
    )
    .unwrap();

    let facts = SystemFacts::collect(&config, &dedup_topology(), &[]).unwrap();
    assert_eq!(facts.version, "20.3 Desktop");
}

#[test]
fn without_meminfo_nothing_is_published() {
    let (dir, config) = host();
    fs::remove_file(dir.path().join("meminfo")).unwrap();
    let bus = Published::default();
    let mut daemon = SystemInfoDaemon::new(config, dedup_topology(), &bus);

    let ((), events) = capture_events(|| daemon.start());

    assert!(!daemon.is_started());
    assert!(bus.installs.borrow().is_empty());
    assert_eq!(at_level(&events, Level::ERROR).len(), 1);
}

#[test]
fn broken_drive_publishes_nothing() {
    let (_dir, config) = host();
    let mut topology = TopologySnapshot::default();
    block(&mut topology, "/b/sda", "/d/a");
    topology.insert(
        "/d/a",
        DRIVE_INTERFACE,
        Properties::from([("Size".into(), PropertyValue::U64(1))]),
    );
    let bus = Published::default();
    let mut daemon = SystemInfoDaemon::new(config, topology, &bus);

    daemon.start();

    assert!(!daemon.is_started());
}

#[test]
fn restart_after_stop_publishes_again() {
    let (_dir, config) = host();
    let bus = Published::default();
    let mut daemon = SystemInfoDaemon::new(config, dedup_topology(), &bus);

    daemon.start();
    daemon.stop();
    daemon.start();

    assert!(daemon.is_started());
    assert_eq!(bus.installs.borrow().len(), 2);
    assert_eq!(*bus.uninstalls.borrow(), 1);
}

#[test]
fn unknown_machine_reports_zero() {
    let (_dir, mut config) = host();
    config.uname_command = vec!["/bin/sh".into(), "-c".into(), "echo riscv64".into()];
    let facts = SystemFacts::collect(&config, &dedup_topology(), &[]).unwrap();
    assert_eq!(facts.system_type.as_i64(), 0);
}

#[test]
fn missing_version_sources_fail_collection() {
    let (dir, config) = host();
    fs::remove_file(dir.path().join("lsb-release")).unwrap();
    assert!(!Path::new(&config.deepin_version).exists());
    assert!(SystemFacts::collect(&config, &dedup_topology(), &[]).is_err());
}

#[test]
fn unreadable_deepin_version_warns_and_uses_lsb() {
    let (dir, config) = host();
    fs::create_dir(dir.path().join("deepin-version")).unwrap();

    let (facts, events) = capture_events(|| SystemFacts::collect(&config, &dedup_topology(), &[]));

    assert_eq!(facts.unwrap().version, "20.3");
    assert_eq!(at_level(&events, Level::WARN).len(), 1);
}
