//! Storage volume discovery
//!
//! Produces the volume roots to crawl plus every mount point on the host.
//! Mount points act as walk boundaries so nested volumes are indexed once and
//! pseudo filesystems are never entered.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// A mounted volume that may be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub root: PathBuf,
    pub fs_type: Option<String>,
}

/// Volumes to crawl and the boundaries the walker must not cross
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    pub volumes: Vec<Volume>,
    /// Every mount point on the host
    pub mount_points: BTreeSet<PathBuf>,
    /// Pseudo and system mounts, never entered
    pub excluded: BTreeSet<PathBuf>,
}

impl MountTable {
    pub fn roots(&self) -> Vec<PathBuf> {
        self.volumes.iter().map(|v| v.root.clone()).collect()
    }

    /// Mount points a walk must not descend into
    ///
    /// When every volume is crawled, each mount point is walked as its own
    /// root, so all of them are boundaries. Explicit roots stop only at
    /// excluded mounts and at each other.
    pub fn boundaries_for(&self, explicit_roots: Option<&[PathBuf]>) -> BTreeSet<PathBuf> {
        match explicit_roots {
            None => self.mount_points.clone(),
            Some(roots) => self.excluded.iter().chain(roots).cloned().collect(),
        }
    }

    fn root_only() -> Self {
        let root = PathBuf::from("/");
        Self {
            volumes: vec![Volume {
                root: root.clone(),
                fs_type: None,
            }],
            mount_points: BTreeSet::from([root]),
            excluded: BTreeSet::new(),
        }
    }
}

/// Filesystem types that never hold user files
const PSEUDO_FS: &[&str] = &[
    "autofs",
    "binfmt_misc",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devpts",
    "devtmpfs",
    "efivarfs",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "nsfs",
    "proc",
    "pstore",
    "rpc_pipefs",
    "securityfs",
    "selinuxfs",
    "sysfs",
    "tracefs",
];

/// Kernel-managed trees; mounts below them are not user volumes
const SYSTEM_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run"];

fn is_pseudo_fs(fs_type: &str) -> bool {
    PSEUDO_FS.contains(&fs_type)
}

fn is_system_mount(mount_point: &str) -> bool {
    SYSTEM_PREFIXES.iter().any(|prefix| {
        mount_point == *prefix
            || mount_point
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Decode the octal escapes (`\040`, `\011`, `\012`, `\134`) used in mount tables
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse the contents of `/proc/self/mounts`
pub fn parse_proc_mounts(content: &str) -> MountTable {
    let mut table = MountTable::default();
    let mut seen = BTreeSet::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(_source), Some(target), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        let target = unescape_mount_field(target);
        table.mount_points.insert(PathBuf::from(&target));

        if is_pseudo_fs(fs_type) || is_system_mount(&target) {
            table.excluded.insert(PathBuf::from(&target));
            continue;
        }
        if seen.insert(target.clone()) {
            table.volumes.push(Volume {
                root: PathBuf::from(target),
                fs_type: Some(fs_type.to_string()),
            });
        }
    }

    if table.volumes.is_empty() {
        table.volumes = MountTable::root_only().volumes;
        table.mount_points.insert(PathBuf::from("/"));
    }
    table
}

/// Discover the host's volumes
#[cfg(target_os = "linux")]
pub fn mount_table() -> MountTable {
    match std::fs::read_to_string("/proc/self/mounts") {
        Ok(content) => parse_proc_mounts(&content),
        Err(e) => {
            tracing::warn!(
                target: "pathdex::crawl",
                error = %e,
                "mount table unavailable, falling back to /"
            );
            MountTable::root_only()
        }
    }
}

/// Discover the host's volumes
#[cfg(target_os = "macos")]
pub fn mount_table() -> MountTable {
    let mut table = MountTable::root_only();
    let entries = match std::fs::read_dir("/Volumes") {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(target: "pathdex::crawl", error = %e, "cannot list /Volumes");
            return table;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        // The boot volume shows up in /Volumes as a link back to /
        let is_root_alias = std::fs::canonicalize(&path)
            .map(|p| p == std::path::Path::new("/"))
            .unwrap_or(false);
        if is_root_alias || !path.is_dir() {
            continue;
        }
        table.mount_points.insert(path.clone());
        table.volumes.push(Volume {
            root: path,
            fs_type: None,
        });
    }
    table
}

/// Discover the host's volumes
#[cfg(windows)]
pub fn mount_table() -> MountTable {
    let mut table = MountTable::default();
    for letter in b'A'..=b'Z' {
        let root = PathBuf::from(format!("{}:\\", letter as char));
        if root.exists() {
            table.mount_points.insert(root.clone());
            table.volumes.push(Volume {
                root,
                fs_type: None,
            });
        }
    }
    table
}

/// Discover the host's volumes
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub fn mount_table() -> MountTable {
    MountTable::root_only()
}
