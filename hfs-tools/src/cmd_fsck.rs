use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use hfs_core::config::CheckOptions;
use hfs_core::device::FileDevice;
use hfs_core::driver::ForcedFsType;
use hfs_core::fsck::{check_hfs, check_hfs_plus, Ask, AlwaysNo, AlwaysYes};
use hfs_core::signature::{detect, FsType};

use crate::style::*;

/// Prompts on stderr and reads a yes/no answer from stdin, for interactive
/// runs with neither `-y`/`-a`/`-p` nor `-n` given.
struct InteractiveAsk;
impl Ask for InteractiveAsk {
    fn ask(&mut self, question: &str) -> bool {
        eprint!("{question} [y/n] ");
        io::stderr().flush().ok();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub(crate) fn run(args: &[String], forced: ForcedFsType) -> i32 {
    let mut fs_type = forced;
    let mut no_repair = false;
    let mut assume_yes = false;
    let mut verbose = false;
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-a" | "-p" | "-y" => assume_yes = true,
            "-n" => no_repair = true,
            "-r" | "-f" => {}
            "-v" => verbose = true,
            "--help" | "-h" => {
                print_usage();
                return 0;
            }
            "--version" => {
                println!("fsck.hfs {}", env!("CARGO_PKG_VERSION"));
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

    let mut device = match FileDevice::open(device_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{RED}fsck: {e}{RESET}");
            return 8;
        }
    };

    // `fsck.hfs` with no forced HFS+ name auto-delegates to the HFS+
    // personality on detecting an HFS+/HFSX signature; both personalities
    // share one binary here, so "delegation" is just picking the other
    // code path rather than re-executing a separate process.
    if fs_type == ForcedFsType::Hfs {
        if let Ok(detected) = detect(&mut device) {
            if matches!(detected, FsType::HfsPlus | FsType::HfsX) {
                fs_type = ForcedFsType::HfsPlus;
            }
        }
    }

    let options = CheckOptions { auto_repair: true, read_only: no_repair, assume_yes, quiet: !verbose };

    let mut ask: Box<dyn Ask> = if no_repair {
        Box::new(AlwaysNo)
    } else if assume_yes {
        Box::new(AlwaysYes)
    } else {
        Box::new(InteractiveAsk)
    };

    let now_posix = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);

    if verbose {
        section("Checking");
        kv("Device", device_path);
    }

    let result = match fs_type {
        ForcedFsType::HfsPlus => check_hfs_plus(&mut device, &options, ask.as_mut(), now_posix),
        ForcedFsType::Hfs => check_hfs(&mut device, &options, ask.as_mut(), now_posix),
    };

    let code = hfs_core::driver::fsck_exit_code(&result);
    match &result {
        Ok(report) => {
            if !options.quiet {
                for f in &report.faults {
                    let status = if f.corrected { "corrected" } else { "reported" };
                    println!("  [{}] {} ({status})", f.phase, f.fault);
                }
                if report.is_clean() {
                    println!("{GREEN}volume is clean{RESET}");
                } else {
                    println!(
                        "{YELLOW}{} fault(s) found, {} corrected{RESET}",
                        report.found_count(),
                        report.corrected_count()
                    );
                }
            }
        }
        Err(e) => eprintln!("{RED}fsck: {e}{RESET}"),
    }
    code
}

fn usage_error(message: &str) -> i32 {
    eprintln!("{RED}fsck: {message}{RESET}");
    print_usage();
    16
}

fn print_usage() {
    eprintln!("usage: fsck.hfs[+] [-a|-p] [-f] [-n] [-r] [-v] [-y] [--license] [--version] DEVICE [PARTITION]");
}

fn print_license() {
    println!("MIT License. See the crate's LICENSE file for the full text.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfs_core::config::FormatOptions;

    fn formatted_image(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("disk.img");
        let size = 4u64 * 1024 * 1024;
        std::fs::write(&path, vec![0u8; size as usize]).unwrap();
        let mut device = FileDevice::create(&path, size).unwrap();
        let options = FormatOptions { volume_name: "Test".into(), ..Default::default() };
        hfs_core::mkfs::format_hfs_plus(&mut device, size, 1_700_000_000, &options).unwrap();
        drop(device);
        path
    }

    #[test]
    fn clean_volume_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = formatted_image(dir.path());
        let code = run(&["-y".to_string(), path.to_str().unwrap().to_string()], ForcedFsType::HfsPlus);
        assert_eq!(code, 0);
    }
}
