use std::time::{SystemTime, UNIX_EPOCH};

use hfs_core::config::FormatOptions;
use hfs_core::device::FileDevice;
use hfs_core::driver::{resolve_partition_target, ForcedFsType, NoPartitionScanner, PartitionScanner};
use hfs_core::error::HfsError;

use crate::style::*;

pub(crate) fn run(args: &[String], forced: ForcedFsType) -> i32 {
    let mut label = "Untitled".to_string();
    let mut fs_type = forced;
    let mut verbose = false;
    let mut force = false;
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-f" => force = true,
            "-v" => verbose = true,
            "-l" => {
                i += 1;
                match args.get(i) {
                    Some(l) => label = l.clone(),
                    None => return usage_error("-l requires a label"),
                }
            }
            "-t" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("hfs") => fs_type = ForcedFsType::Hfs,
                    Some("hfs+") => fs_type = ForcedFsType::HfsPlus,
                    _ => return usage_error("-t requires 'hfs' or 'hfs+'"),
                }
            }
            "--help" | "-h" => {
                print_usage();
                return 0;
            }
            "--version" => {
                println!("mkfs.hfs {}", env!("CARGO_PKG_VERSION"));
                return 0;
            }
            "--license" => {
                print_license();
                return 0;
            }
            other if other.starts_with('-') => return usage_error(&format!("unknown option {other}")),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    if positional.is_empty() {
        return usage_error("DEVICE is required");
    }
    let device_path = &positional[0];
    let requested_partition = positional.get(1).and_then(|p| p.parse::<u32>().ok());

    let mut scanner = NoPartitionScanner;
    let scan_result = match scanner.scan(device_path) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("{RED}mkfs: {e}{RESET}");
            return 8;
        }
    };
    if let Err(e) = resolve_partition_target(scan_result, requested_partition, force) {
        eprintln!("{RED}mkfs: {e}{RESET}");
        return hfs_core::driver::mkfs_exit_code(&Err(e));
    }

    let now_posix = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);

    let device_size = match std::fs::metadata(device_path) {
        Ok(m) => m.len(),
        Err(e) => {
            eprintln!("{RED}mkfs: cannot stat {device_path}: {e}{RESET}");
            return 8;
        }
    };

    if device_size < 800 * 1024 {
        eprintln!("{RED}mkfs: volume smaller than 800 KiB cannot be formatted{RESET}");
        return 2;
    }

    if !force {
        if let Ok(mut existing) = std::fs::File::open(device_path) {
            if let Ok(fs_type) = hfs_core::signature::detect(&mut existing) {
                if !matches!(fs_type, hfs_core::signature::FsType::Unknown(_)) {
                    eprintln!("{RED}mkfs: {}{RESET}", HfsError::DeviceOccupied);
                    return hfs_core::driver::mkfs_exit_code(&Err(HfsError::DeviceOccupied));
                }
            }
        }
    }

    let mut device = match FileDevice::create(device_path, device_size) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{RED}mkfs: {e}{RESET}");
            return match e {
                HfsError::PermissionDenied => 8,
                _ => 1,
            };
        }
    };

    let options = FormatOptions { volume_name: label, use_hfs_plus: fs_type == ForcedFsType::HfsPlus, verbose, ..Default::default() };

    if verbose {
        section("Formatting");
        kv("Device", device_path);
        kv("Size", &format_size(device_size));
        kv("Filesystem", if fs_type == ForcedFsType::HfsPlus { "HFS+" } else { "HFS" });
    }

    let result = match fs_type {
        ForcedFsType::HfsPlus => hfs_core::mkfs::format_hfs_plus(&mut device, device_size, now_posix, &options).map(|_| ()),
        ForcedFsType::Hfs => hfs_core::mkfs::format_hfs(&mut device, device_size, now_posix, &options).map(|_| ()),
    };

    let code = hfs_core::driver::mkfs_exit_code(&result);
    match &result {
        Ok(()) => {
            if verbose {
                println!("  {GREEN}done{RESET}");
            }
        }
        Err(e) => eprintln!("{RED}mkfs: {e}{RESET}"),
    }
    code
}

fn usage_error(message: &str) -> i32 {
    eprintln!("{RED}mkfs: {message}{RESET}");
    print_usage();
    2
}

fn print_usage() {
    eprintln!("usage: mkfs.hfs[+] [-f] [-l LABEL] [-t hfs|hfs+] [-v] DEVICE [PARTITION]");
}

fn print_license() {
    println!("MIT License. See the crate's LICENSE file for the full text.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_volume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.img");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();
        let code = run(&[path.to_str().unwrap().to_string()], ForcedFsType::HfsPlus);
        assert_eq!(code, 2);
    }

    #[test]
    fn formats_a_fresh_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();
        let code = run(&[path.to_str().unwrap().to_string()], ForcedFsType::HfsPlus);
        assert_eq!(code, 0);
    }
}
