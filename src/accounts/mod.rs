//! Account-side helpers: who a new user is, and seeding their home

mod user_data;

pub use user_data::*;

use nix::unistd::{Group, Uid, User};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::paths;

/// A host account as the provisioner sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub uid: u32,
    pub name: String,
    pub home: PathBuf,
    pub primary_group: String,
}

/// Source of account records (passwd/group in production)
pub trait UserDatabase {
    fn lookup(&self, uid: u32) -> Result<Option<UserAccount>>;
}

/// Host account database via getpwuid_r/getgrgid_r
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUserDatabase;

impl UserDatabase for SystemUserDatabase {
    fn lookup(&self, uid: u32) -> Result<Option<UserAccount>> {
        let user = User::from_uid(Uid::from_raw(uid))
            .map_err(|e| Error::parse(format!("passwd entry {uid}"), e.to_string()))?;
        let Some(user) = user else {
            return Ok(None);
        };

        // A dangling primary gid still leaves a usable account
        let primary_group = match Group::from_gid(user.gid) {
            Ok(Some(group)) => group.name,
            _ => user.gid.to_string(),
        };

        Ok(Some(UserAccount {
            uid,
            name: user.name,
            home: user.dir,
            primary_group,
        }))
    }
}

/// `/com/deepin/daemon/Accounts/User1001` -> 1001
pub fn uid_from_user_path(path: &str) -> Result<u32> {
    let id = path
        .strip_prefix(paths::ACCOUNTS_USER_PREFIX)
        .ok_or_else(|| Error::parse(path, "not an accounts user object"))?;
    id.parse()
        .map_err(|_| Error::parse(path, format!("invalid uid '{id}'")))
}
