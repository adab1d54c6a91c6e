// system configuration and command line processing

use crate::files::FileHandle;
use crate::kernel::DEFAULT_MEMORY;
use crate::messages::DebugLevel;
use crate::runtime::ForthRuntime;
use argh::FromArgs;

pub const VERSION: &str = "0.1.0";

/// rs4th, a minimal Forth interpreter
#[derive(FromArgs)]
struct Args {
    /// memory arena size in bytes
    #[argh(option, short = 'm', default = "DEFAULT_MEMORY")]
    memory: usize,

    /// forth source file to evaluate before reading stdin
    #[argh(option, short = 'f')]
    file: Option<String>,

    /// diagnostic level: error, warning, info or debug
    #[argh(option, short = 'd')]
    debuglevel: Option<String>,
}

pub struct Config {
    pub debug_level: DebugLevel,
    pub loaded_file: String,
    pub memory: usize,
    pub run: bool,
}

impl Config {
    pub fn new() -> Config {
        Config {
            debug_level: DebugLevel::Error,
            loaded_file: "".to_owned(),
            memory: DEFAULT_MEMORY,
            run: true,
        }
    }

    /// process_args fills the config from the command line.
    pub fn process_args(&mut self) -> &Config {
        let args: Args = argh::from_env();
        self.memory = args.memory;
        if let Some(file) = args.file {
            self.loaded_file = file;
        }
        if let Some(level) = args.debuglevel {
            self.debug_level = match level.as_str() {
                "debug" => DebugLevel::Debug,
                "info" => DebugLevel::Info,
                "warning" => DebugLevel::Warning,
                _ => DebugLevel::Error,
            };
        }
        self
    }

    /// run_forth builds the runtime and drives the session.
    pub fn run_forth(&self) {
        let mut runtime = ForthRuntime::new(self.memory);
        runtime.msg.set_level(self.debug_level);
        runtime.cold_start();
        if !self.loaded_file.is_empty() {
            match FileHandle::open(&self.loaded_file) {
                Ok(handle) => runtime.reader.push(handle),
                Err(e) => runtime.msg.error(
                    "run_forth",
                    "unable to open source file",
                    Some(e.to_string()),
                ),
            }
        }
        runtime.run();
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
