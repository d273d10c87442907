//! Entry point shared by every `mkfs.hfs*`/`fsck.hfs*`/`mount.hfs*`
//! binary target: `argv[0]`'s basename picks the personality and the
//! forced filesystem type, the matching command module parses the rest.

mod cmd_fsck;
mod cmd_mkfs;
mod cmd_mount;
mod style;

use std::env;
use std::process;

use hfs_core::driver::{classify_program_name, ProgramKind};

fn main() {
    let args: Vec<String> = env::args().collect();
    let program_name = classify_program_name(&args[0]);

    let Some(program) = program_name else {
        eprintln!("unrecognized program name {:?}; expected mkfs.hfs*, fsck.hfs*, or mount.hfs*", args[0]);
        process::exit(16);
    };

    let code = match program.kind {
        ProgramKind::Mkfs => cmd_mkfs::run(&args[1..], program.forced),
        ProgramKind::Fsck => cmd_fsck::run(&args[1..], program.forced),
        ProgramKind::Mount => cmd_mount::run(&args[1..], program.forced),
    };
    process::exit(code);
}
