//! Static system configuration generation.
//!
//! Writes `/etc/passwd`, `/etc/group`, `/etc/fstab`, and `/etc/os-release`
//! into the install root after the package phases finish.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::{Meta, SystemUser};

const BASE_PASSWD: &[&str] = &[
    "root:x:0:0:root:/root:/bin/bash",
    "daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin",
    "bin:x:2:2:bin:/bin:/usr/sbin/nologin",
    "sys:x:3:3:sys:/dev:/usr/sbin/nologin",
];

const BASE_GROUPS: &[&str] = &[
    "root:x:0:",
    "daemon:x:1:",
    "bin:x:2:",
    "sys:x:3:",
    "wheel:x:10:",
    "sudo:x:27:",
    "users:x:100:",
];

const FSTAB: &str = "\
# file system  mount-point  type   options          dump  fsck
#                                                            order
/dev/sda1      /            ext4   defaults         1     1
proc           /proc        proc   nosuid,noexec,nodev 0     0
sysfs          /sys         sysfs  nosuid,noexec,nodev 0     0
devpts         /dev/pts     devpts gid=5,mode=620   0     0
tmpfs          /run         tmpfs  defaults         0     0
devtmpfs       /dev         devtmpfs mode=0755,nosuid 0     0
";

/// Write fstab and os-release for the distribution.
pub fn write_system_config(root: &Path, meta: &Meta) -> Result<()> {
    info!("creating system configuration");
    let etc = root.join("etc");
    fs::create_dir_all(&etc)?;

    fs::write(etc.join("fstab"), FSTAB).context("failed to write /etc/fstab")?;

    let os_release = format!(
        "NAME=\"{name}\"\n\
         VERSION=\"{version}\"\n\
         ID={id}\n\
         ID_LIKE=linux\n\
         PRETTY_NAME=\"{name} {version}\"\n\
         VERSION_ID=\"{version}\"\n\
         HOME_URL=\"https://github.com/windfall-tech/windfall-linux\"\n",
        name = meta.name,
        version = meta.version,
        id = meta.name.trim().to_lowercase(),
    );
    fs::write(etc.join("os-release"), os_release).context("failed to write /etc/os-release")?;

    Ok(())
}

/// Write passwd and group files: the base system accounts plus every
/// declared system user, including supplementary group membership.
pub fn write_system_users(root: &Path, users: &[SystemUser]) -> Result<()> {
    info!("creating {} system users", users.len());
    let etc = root.join("etc");
    fs::create_dir_all(&etc)?;

    let mut passwd_lines: Vec<String> = BASE_PASSWD.iter().map(|s| s.to_string()).collect();
    let mut group_lines: Vec<String> = BASE_GROUPS.iter().map(|s| s.to_string()).collect();

    for user in users {
        // root is always present in the base entries.
        if user.name == "root" {
            continue;
        }
        passwd_lines.push(format!(
            "{name}:x:{uid}:{gid}:{name}:{home}:{shell}",
            name = user.name,
            uid = user.uid,
            gid = user.gid,
            home = user.home,
            shell = user.shell,
        ));

        let has_primary_group = group_lines
            .iter()
            .any(|line| line.starts_with(&format!("{}:", user.name)));
        if !has_primary_group {
            group_lines.push(format!("{}:x:{}:", user.name, user.gid));
        }

        for group in &user.groups {
            add_group_member(&mut group_lines, group, &user.name);
        }
    }

    fs::write(etc.join("passwd"), passwd_lines.join("\n") + "\n")
        .context("failed to write /etc/passwd")?;
    fs::write(etc.join("group"), group_lines.join("\n") + "\n")
        .context("failed to write /etc/group")?;

    Ok(())
}

/// Append `member` to `group`'s member list if the group exists and the
/// member is not already present.
fn add_group_member(group_lines: &mut [String], group: &str, member: &str) {
    let prefix = format!("{group}:");
    for line in group_lines.iter_mut() {
        if !line.starts_with(&prefix) {
            continue;
        }
        let mut parts: Vec<String> = line.split(':').map(|s| s.to_string()).collect();
        if parts.len() == 4 {
            let mut members: Vec<&str> = parts[3].split(',').filter(|m| !m.is_empty()).collect();
            if !members.contains(&member) {
                members.push(member);
                parts[3] = members.join(",");
                *line = parts.join(":");
            }
        }
        return;
    }
}
