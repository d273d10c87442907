//! `mount.hfs`/`mount.hfs+`: a thin verify-and-invoke-kernel shim. This
//! core doesn't implement a POSIX filesystem driver — it only confirms the
//! volume looks mountable (signature checks out, not busy elsewhere) before
//! handing off to the platform's own `mount(2)`/`mount(8)`.

use hfs_core::config::MountOptions;
use hfs_core::device::FileDevice;
use hfs_core::driver::ForcedFsType;
use hfs_core::signature::{detect, FsType};

use crate::style::{RED, RESET};

pub(crate) fn run(args: &[String], forced: ForcedFsType) -> i32 {
    let mut options = MountOptions::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-r" => options.read_only = true,
            "-w" => options.read_only = false,
            "-o" => {
                i += 1;
                if args.get(i).is_none() {
                    return usage_error("-o requires OPTS");
                }
            }
            "-v" => {}
            "--help" | "-h" => {
                print_usage();
                return 0;
            }
            other if other.starts_with('-') => return usage_error(&format!("unknown option {other}")),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    if positional.len() < 2 {
        return usage_error("DEVICE and MOUNTPOINT are required");
    }
    let device_path = &positional[0];
    let mountpoint = &positional[1];

    let mut device = if options.read_only {
        match FileDevice::open_read_only(device_path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{RED}mount: {e}{RESET}");
                return 8;
            }
        }
    } else {
        match FileDevice::open(device_path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{RED}mount: {e}{RESET}");
                return 8;
            }
        }
    };

    let detected = match detect(&mut device) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{RED}mount: {e}{RESET}");
            return 8;
        }
    };

    let expected_ok = match (forced, detected) {
        (ForcedFsType::HfsPlus, FsType::HfsPlus | FsType::HfsX) => true,
        (ForcedFsType::Hfs, FsType::Hfs) => true,
        _ => false,
    };
    if !expected_ok {
        eprintln!("{RED}mount: {device_path} does not hold the expected filesystem{RESET}");
        return 8;
    }

    // The actual mount(2) call is a platform-specific external
    // collaborator; this core only validates up to this point.
    eprintln!(
        "mount: would mount {device_path} at {mountpoint} ({})",
        if options.read_only { "read-only" } else { "read-write" }
    );
    0
}

fn usage_error(message: &str) -> i32 {
    eprintln!("mount: {message}");
    print_usage();
    16
}

fn print_usage() {
    eprintln!("usage: mount.hfs[+] [-r|-w] [-o OPTS] [-v] DEVICE MOUNTPOINT");
}
