/// System locale configuration scanned for `LANG=`
pub const LOCALE_FILE: &str = "/etc/default/locale";

/// Language used when no locale can be determined
pub const DEFAULT_LANG: &str = "en_US";

/// Skeleton search prefixes, local administrator overrides first
pub const SKEL_SEARCH_PATH: &[&str] = &["/usr/local/share", "/usr/share"];

/// Locale-independent skeleton, relative to a search prefix
pub const SKEL_COMMON: &str = "deepin-default-settings/skel.common";

/// Locale skeleton prefix; the language tag is appended
pub const SKEL_LANG_PREFIX: &str = "deepin-default-settings/skel.";

pub const DEEPIN_VERSION: &str = "/etc/deepin-version";
pub const LSB_RELEASE: &str = "/etc/lsb-release";
pub const CPUINFO: &str = "/proc/cpuinfo";
pub const MEMINFO: &str = "/proc/meminfo";

pub const UDISKS2_DEST: &str = "org.freedesktop.UDisks2";
pub const UDISKS2_PATH: &str = "/org/freedesktop/UDisks2";

pub const SYSTEM_INFO_NAME: &str = "com.deepin.daemon.SystemInfo";
pub const SYSTEM_INFO_PATH: &str = "/com/deepin/daemon/SystemInfo";

/// Accounts daemon user objects are `<prefix><uid>`
pub const ACCOUNTS_USER_PREFIX: &str = "/com/deepin/daemon/Accounts/User";
