// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! xr-tui CLI entrypoint.
//!
//! Opens one dataset (or several sibling files) through the backend registry and runs the
//! interactive browser. `--list-backends` prints the registered globs instead.

use std::error::Error;
use std::path::PathBuf;

use tracing::info;
use xr_tui::backend::{BackendRegistry, LoadContext};
use xr_tui::config::{parse_bins, Config};
use xr_tui::file_info::FileInfo;
use xr_tui::logging::{init_logging, LogConfig};
use xr_tui::store::Location;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <file-or-url>... [--group <path>] [--config <file>] [--log-file <file>] [--bins <n>]\n  {program} --list-backends\n\nSeveral files must share one directory and one extension; each becomes a child group.\n--group re-roots the tree at a group path and needs exactly one input.\n--config reads a TOML file (default: $XR_TUI_CONFIG, then $XDG_CONFIG_HOME/xr-tui/config.toml).\n--log-file writes tracing output to a file; the terminal itself is never logged to.\n--bins sets the number of histogram bins (default 100)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    inputs: Vec<String>,
    group: Option<String>,
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    bins: Option<usize>,
    list_backends: bool,
}

impl CliOptions {
    /// Flags win over the config file and environment.
    fn apply_to(&self, config: &mut Config) {
        if let Some(bins) = self.bins {
            config.histogram_bins = bins;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
    }
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list-backends" => {
                if options.list_backends {
                    return Err(());
                }
                options.list_backends = true;
            }
            "--group" => {
                if options.group.is_some() {
                    return Err(());
                }
                options.group = Some(args.next().ok_or(())?);
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(PathBuf::from(args.next().ok_or(())?));
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(PathBuf::from(args.next().ok_or(())?));
            }
            "--bins" => {
                if options.bins.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.bins = Some(parse_bins("--bins", &raw).map_err(|_| ())?);
            }
            _ if arg.starts_with('-') && arg != "-" => return Err(()),
            _ => options.inputs.push(arg),
        }
    }

    if options.list_backends {
        if !options.inputs.is_empty() || options.group.is_some() {
            return Err(());
        }
        return Ok(options);
    }

    if options.inputs.is_empty() {
        return Err(());
    }

    if options.group.is_some() && options.inputs.len() > 1 {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "xr-tui".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let registry = BackendRegistry::with_builtins();
        if options.list_backends {
            for (pattern, backend) in registry.entries() {
                println!("{pattern:<16} {backend}");
            }
            return Ok(());
        }

        let mut config = Config::load(options.config.as_deref())?;
        options.apply_to(&mut config);
        init_logging(&LogConfig::from(&config))?;

        let locations = options
            .inputs
            .iter()
            .map(|raw| Location::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let ctx = LoadContext::new(config.clone());
        let data = registry.open(&ctx, &locations, options.group.as_deref())?;
        let info = FileInfo::collect(&locations)?;
        info!(inputs = locations.len(), "dataset ready");

        let source = options.inputs.join(", ");
        xr_tui::tui::run(data, &source, &info, &config)
    })();

    if let Err(err) = result {
        eprintln!("xr-tui: {err}");
        std::process::exit(1);
    }
}
