//! Bootloader configuration generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Meta;

/// Write a GRUB configuration for the built distribution into
/// `<root>/boot/grub/grub.cfg`.
pub fn write_grub_config(root: &Path, meta: &Meta) -> Result<()> {
    info!("setting up bootloader");

    let grub_cfg = format!(
        "set default=0\n\
         set timeout=5\n\
         \n\
         menuentry \"{name} {version}\" {{\n\
         \x20   linux   /boot/vmlinuz root=/dev/sda1 ro\n\
         \x20   initrd  /boot/initrd.img\n\
         }}\n",
        name = meta.name,
        version = meta.version,
    );

    let grub_dir = root.join("boot/grub");
    fs::create_dir_all(&grub_dir)
        .with_context(|| format!("failed to create {}", grub_dir.display()))?;
    fs::write(grub_dir.join("grub.cfg"), grub_cfg).context("failed to write grub.cfg")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grub_config_content() {
        let temp = TempDir::new().unwrap();
        let meta = Meta {
            name: "WindfallLinux".to_string(),
            version: "1.0".to_string(),
        };
        write_grub_config(temp.path(), &meta).unwrap();

        let cfg = fs::read_to_string(temp.path().join("boot/grub/grub.cfg")).unwrap();
        assert!(cfg.contains("menuentry \"WindfallLinux 1.0\""));
        assert!(cfg.contains("linux   /boot/vmlinuz"));
        assert!(cfg.contains("set timeout=5"));
    }
}
