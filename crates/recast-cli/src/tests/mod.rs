//! In-process tests of the CLI runtime.

mod unit;

use std::ffi::OsString;
use std::process::ExitCode;

use recast_config::Config;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// Loader returning a fixed configuration.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Captured result of one CLI invocation.
pub(super) struct Invocation {
    pub(super) exit_code: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn invoke(config: Config, args: &[&str]) -> Invocation {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let loader = StaticConfigLoader::new(config);
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        let args = std::iter::once("recast")
            .chain(args.iter().copied())
            .map(OsString::from);
        run_with_loader(args, &mut io, &loader)
    };
    Invocation {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}
