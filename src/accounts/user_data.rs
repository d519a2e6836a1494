//! Seeding a new account's home from the deepin-default-settings skeletons.
//!
//! Provisioning is best-effort. Each step logs its own failure and the next
//! step still runs; nothing is reported back to the caller.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{uid_from_user_path, UserDatabase};
use crate::config::AccountsConfig;
use crate::error::{Error, Result};
use crate::textconf;
use crate::util;

/// Ownership repair applied to the home directory after copying
pub trait OwnerRepair {
    fn repair(&self, path: &Path, owner: &str, group: &str) -> Result<()>;
}

/// `chown -hR` semantics through lchown(2)
#[derive(Debug, Default, Clone, Copy)]
pub struct LchownWalk;

impl OwnerRepair for LchownWalk {
    fn repair(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
        util::chown_tree(path, owner, group)
    }
}

/// First existing `<prefix>/<relative>` in search order
pub fn find_skeleton(search_path: &[PathBuf], relative: &str) -> Result<PathBuf> {
    search_path
        .iter()
        .map(|prefix| prefix.join(relative))
        .find(|candidate| util::is_exist(candidate))
        .ok_or_else(|| Error::not_found(format!("user data '{relative}'")))
}

pub struct Provisioner<D, O = LchownWalk> {
    db: D,
    owner: O,
    config: AccountsConfig,
}

impl<D: UserDatabase> Provisioner<D> {
    pub fn new(db: D, config: AccountsConfig) -> Self {
        Self::with_owner_repair(db, LchownWalk, config)
    }
}

impl<D: UserDatabase, O: OwnerRepair> Provisioner<D, O> {
    pub fn with_owner_repair(db: D, owner: O, config: AccountsConfig) -> Self {
        Self { db, owner, config }
    }

    /// Copy the common and locale skeletons into the home of `uid`, then
    /// hand the whole home over to the account.
    pub fn provision(&self, uid: u32) {
        let account = match self.db.lookup(uid) {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(uid, "Find user by uid failed: no such account");
                return;
            }
            Err(e) => {
                warn!(uid, "Find user by uid failed: {}", e);
                return;
            }
        };

        let lang = self.current_lang();

        if let Err(e) = self.copy_common(&account.home) {
            debug!(user = %account.name, "Copy common datas failed: {}", e);
        }
        if let Err(e) = self.copy_by_lang(&account.home, &lang) {
            debug!(user = %account.name, lang = %lang, "Copy user datas failed: {}", e);
        }

        if let Err(e) = self.owner.repair(&account.home, &account.name, &account.name) {
            warn!(user = %account.name, "Chown failed: {}", e);
            return;
        }

        info!(user = %account.name, home = %account.home.display(), lang = %lang, "Provisioned user data");
    }

    /// Same as [`provision`](Self::provision), keyed by accounts object path
    pub fn provision_user_path(&self, path: &str) {
        match uid_from_user_path(path) {
            Ok(uid) => self.provision(uid),
            Err(e) => warn!(path, "Find user by path failed: {}", e),
        }
    }

    /// Language tag from the locale file, or the configured default
    pub fn current_lang(&self) -> String {
        match textconf::read_locale(&self.config.locale_file) {
            Ok(lang) if !lang.is_empty() => lang,
            Ok(_) => self.config.default_lang.clone(),
            Err(e) => {
                debug!("Read default locale failed: {}", e);
                self.config.default_lang.clone()
            }
        }
    }

    pub fn copy_common(&self, home: &Path) -> Result<()> {
        let data = find_skeleton(&self.config.skel_search_path, &self.config.skel_common)?;
        util::copy_tree(&data, home)
    }

    pub fn copy_by_lang(&self, home: &Path, lang: &str) -> Result<()> {
        let relative = format!("{}{}", self.config.skel_lang_prefix, lang);
        let data = find_skeleton(&self.config.skel_search_path, &relative)?;
        util::copy_tree(&data, home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::UserAccount;
    use crate::paths::SKEL_COMMON;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    struct StaticDatabase(HashMap<u32, UserAccount>);

    impl UserDatabase for StaticDatabase {
        fn lookup(&self, uid: u32) -> Result<Option<UserAccount>> {
            Ok(self.0.get(&uid).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingOwner {
        calls: RefCell<Vec<(PathBuf, String, String)>>,
    }

    impl OwnerRepair for &RecordingOwner {
        fn repair(&self, path: &Path, owner: &str, group: &str) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((path.to_path_buf(), owner.into(), group.into()));
            Ok(())
        }
    }

    fn config_for(root: &Path) -> AccountsConfig {
        AccountsConfig {
            locale_file: root.join("etc/default/locale"),
            skel_search_path: vec![root.join("usr/local/share"), root.join("usr/share")],
            ..AccountsConfig::default()
        }
    }

    fn alice(root: &Path) -> StaticDatabase {
        let home = root.join("home/alice");
        fs::create_dir_all(&home).unwrap();
        StaticDatabase(HashMap::from([(
            1001,
            UserAccount {
                uid: 1001,
                name: "alice".into(),
                home,
                primary_group: "users".into(),
            },
        )]))
    }

    #[test]
    fn find_skeleton_prefers_local_prefix() {
        let root = tempdir().unwrap();
        let config = config_for(root.path());
        fs::create_dir_all(root.path().join("usr/share/deepin-default-settings/skel.common"))
            .unwrap();
        fs::create_dir_all(root.path().join("usr/local/share/deepin-default-settings/skel.common"))
            .unwrap();

        let found = find_skeleton(&config.skel_search_path, SKEL_COMMON).unwrap();
        assert_eq!(
            found,
            root.path().join("usr/local/share/deepin-default-settings/skel.common")
        );
    }

    #[test]
    fn find_skeleton_falls_back_to_usr_share() {
        let root = tempdir().unwrap();
        let config = config_for(root.path());
        fs::create_dir_all(root.path().join("usr/share/deepin-default-settings/skel.common"))
            .unwrap();

        let found = find_skeleton(&config.skel_search_path, SKEL_COMMON).unwrap();
        assert!(found.starts_with(root.path().join("usr/share")));
        assert!(util::is_exist(&found));
    }

    #[test]
    fn find_skeleton_not_found() {
        let root = tempdir().unwrap();
        let config = config_for(root.path());
        let err = find_skeleton(&config.skel_search_path, SKEL_COMMON).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn current_lang_defaults_when_file_missing() {
        let root = tempdir().unwrap();
        let p = Provisioner::new(alice(root.path()), config_for(root.path()));
        assert_eq!(p.current_lang(), "en_US");
    }

    #[test]
    fn current_lang_defaults_without_lang_line() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("etc/default")).unwrap();
        fs::write(root.path().join("etc/default/locale"), "LC_ALL=C\n").unwrap();
        let p = Provisioner::new(alice(root.path()), config_for(root.path()));
        assert_eq!(p.current_lang(), "en_US");
    }

    #[test]
    fn locale_skeleton_overrides_common() {
        let root = tempdir().unwrap();
        let share = root.path().join("usr/share/deepin-default-settings");
        fs::create_dir_all(share.join("skel.common")).unwrap();
        fs::create_dir_all(share.join("skel.fr_FR")).unwrap();
        fs::write(share.join("skel.common/.bashrc"), "common").unwrap();
        fs::write(share.join("skel.fr_FR/.bashrc"), "fr").unwrap();
        fs::create_dir_all(root.path().join("etc/default")).unwrap();
        fs::write(root.path().join("etc/default/locale"), "LANG=fr_FR.UTF-8\n").unwrap();

        let owner = RecordingOwner::default();
        let p = Provisioner::with_owner_repair(alice(root.path()), &owner, config_for(root.path()));
        p.provision(1001);

        let home = root.path().join("home/alice");
        assert_eq!(fs::read_to_string(home.join(".bashrc")).unwrap(), "fr");
        assert_eq!(
            owner.calls.borrow().as_slice(),
            &[(home, "alice".to_string(), "alice".to_string())]
        );
    }

    #[test]
    fn unknown_uid_touches_nothing() {
        let root = tempdir().unwrap();
        let owner = RecordingOwner::default();
        let p = Provisioner::with_owner_repair(alice(root.path()), &owner, config_for(root.path()));
        p.provision(4242);
        assert!(owner.calls.borrow().is_empty());
    }

    #[test]
    fn missing_skeletons_still_repair_ownership() {
        let root = tempdir().unwrap();
        let owner = RecordingOwner::default();
        let p = Provisioner::with_owner_repair(alice(root.path()), &owner, config_for(root.path()));
        p.provision(1001);
        assert_eq!(owner.calls.borrow().len(), 1);
    }

    #[test]
    fn provision_by_user_path() {
        let root = tempdir().unwrap();
        let owner = RecordingOwner::default();
        let p = Provisioner::with_owner_repair(alice(root.path()), &owner, config_for(root.path()));
        p.provision_user_path("/com/deepin/daemon/Accounts/User1001");
        p.provision_user_path("/com/deepin/daemon/Accounts/Userx");
        assert_eq!(owner.calls.borrow().len(), 1);
    }
}
