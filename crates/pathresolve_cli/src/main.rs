/* 📖 # Why is the CLI a single positional argument?

`pathresolve <pattern>` takes exactly one path or pattern and nothing else, so
there is no argument parser. Settings that would otherwise be flags live in an
optional `pathresolve.toml` in the current directory.

Output:
- stdout: the `<pattern>:` header, one matched path per line, then any
  warnings from the resolver
- stderr: tracing logs, filtered by `PATHRESOLVE_LOG` (default `warn`)

Exit codes:
- 0: Success (including a scan that stopped early or matched nothing)
- 1: Missing argument, unreadable configuration, or stdout could not be written
*/

use std::env;
use std::io;
use std::process;

use tracing::error;

use pathresolve_base::tracing::init_tracing;
use pathresolve_base::{FilePath, PalHandle, RealPal};
use pathresolve_engine::{
    CONFIG_FILE_NAME, Severity, WriterSink, load_config_or_default, run_listing,
};

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Warning: logging is unavailable: {}", e);
    }

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });

    let pal = PalHandle::new(RealPal::new(current_dir));

    let config = match load_config_or_default(&pal, &FilePath::from(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from {}: {}", CONFIG_FILE_NAME, e);
            process::exit(1);
        }
    };

    let sink = WriterSink::new(io::stdout(), Severity::Warning);
    let mut stdout = io::stdout();
    match run_listing(&pal, env::args_os().skip(1), &config, &mut stdout, &sink) {
        Ok(status) => process::exit(status.code()),
        Err(e) => {
            error!(error = %e, "listing failed");
            eprint!("Error: {:?}", e);
            process::exit(1);
        }
    }
}
