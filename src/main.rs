use std::env;
use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;

use adb_session::{Adb, AdbOptions};

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    let mut options = AdbOptions::default();
    let mut overwrite = false;
    let mut third_party = false;
    let mut positional: Vec<String> = Vec::new();

    for arg in &args {
        if arg == "--help" || arg == "-h" {
            print_help();
            return ExitCode::SUCCESS;
        } else if arg == "--version" || arg == "-V" {
            println!("adb-session v{}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        } else if arg == "--strict" {
            options.strict_listings = true;
        } else if arg == "--overwrite" {
            overwrite = true;
        } else if arg == "--third-party" {
            third_party = true;
        } else if let Some(rest) = arg.strip_prefix("--timeout-secs=") {
            match rest.parse::<u64>() {
                Ok(secs) => options.command_timeout = Some(Duration::from_secs(secs)),
                Err(_) => {
                    eprintln!("invalid --timeout-secs value: {rest}");
                    return ExitCode::FAILURE;
                }
            }
        } else if arg.starts_with('-') {
            eprintln!("unknown flag: {arg}");
            print_help();
            return ExitCode::FAILURE;
        } else {
            positional.push(arg.clone());
        }
    }

    if positional.is_empty() {
        print_help();
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(&positional, options, overwrite, third_party)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(
    args: &[String],
    options: AdbOptions,
    overwrite: bool,
    third_party: bool,
) -> Result<(), Box<dyn Error>> {
    let adb = Adb::with_options(options)?;

    match args[0].as_str() {
        "devices" => {
            for device in adb.get_devices().await? {
                println!("{device}");
            }
        }
        "apps" => {
            let device = expect_arg(args, 1, "device")?;
            for package in adb.get_apps(device, third_party).await? {
                println!("{package}");
            }
        }
        "search" => {
            let device = expect_arg(args, 1, "device")?;
            let pattern = expect_arg(args, 2, "pattern")?;
            for package in adb.search_package(device, pattern).await? {
                println!("{package}");
            }
        }
        "paths" => {
            let device = expect_arg(args, 1, "device")?;
            let package = expect_arg(args, 2, "package")?;
            match adb.get_package_artifacts(device, package).await? {
                Some(artifacts) => {
                    for artifact in artifacts {
                        println!("{artifact}");
                    }
                }
                None => return Err(format!("could not determine artifact paths for {package}").into()),
            }
        }
        "rooted" => {
            let device = expect_arg(args, 1, "device")?;
            println!("{}", adb.is_rooted(device).await?);
        }
        "install" => {
            let device = expect_arg(args, 1, "device")?;
            let artifacts = &args[2..];
            if artifacts.is_empty() {
                return Err("usage: install <device> <apk> [more split apks]".into());
            }
            let installed = if artifacts.len() == 1 {
                adb.install_package(device, &artifacts[0]).await?
            } else {
                adb.install_split_package(device, artifacts).await?
            };
            if !installed {
                return Err("device refused the install".into());
            }
            println!("installed");
        }
        "uninstall" => {
            let device = expect_arg(args, 1, "device")?;
            let package = expect_arg(args, 2, "package")?;
            if !adb.uninstall_package(device, package).await? {
                return Err(format!("device refused to uninstall {package}").into());
            }
            println!("uninstalled");
        }
        "push" => {
            let device = expect_arg(args, 1, "device")?;
            let source = expect_arg(args, 2, "local source")?;
            let destination = expect_arg(args, 3, "remote destination")?;
            adb.push(device, source, destination, overwrite).await?;
            println!("pushed {source} -> {destination}");
        }
        "pull" => {
            let device = expect_arg(args, 1, "device")?;
            let source = expect_arg(args, 2, "remote source")?;
            let destination = expect_arg(args, 3, "local destination")?;
            adb.pull(device, source, destination, overwrite).await?;
            println!("pulled {source} -> {destination}");
        }
        other => {
            return Err(format!("unknown subcommand: {other}").into());
        }
    }

    Ok(())
}

fn expect_arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument: <{name}>"))
}

fn print_help() {
    println!("adb-session - session layer over the adb binary");
    println!();
    println!("USAGE:");
    println!("    adb-session [FLAGS] <SUBCOMMAND> [ARGS]");
    println!();
    println!("SUBCOMMANDS:");
    println!("    devices                                List connected device identifiers");
    println!("    apps <device>                          List installed packages");
    println!("    search <device> <pattern>              Search packages by name substring");
    println!("    paths <device> <package>               Show a package's artifact paths");
    println!("    rooted <device>                        Report whether the device is rooted");
    println!("    install <device> <apk> [apk...]        Install a package (split with several apks)");
    println!("    uninstall <device> <package>           Uninstall a package");
    println!("    push <device> <local> <remote>         Copy a local file onto the device");
    println!("    pull <device> <remote> <local>         Copy a device file to a local path");
    println!();
    println!("FLAGS:");
    println!("    --third-party         Restrict 'apps' to non-system packages");
    println!("    --overwrite           Allow push/pull to replace an existing destination");
    println!("    --strict              Report failed listing commands instead of an empty list");
    println!("    --timeout-secs=<n>    Bound query commands (transfers always run unbounded)");
    println!("    --help, -h            Show this help message");
    println!("    --version, -V         Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    adb-session devices");
    println!("    adb-session apps emulator-5554 --third-party");
    println!("    adb-session push emulator-5554 app.apk /data/local/tmp/app.apk --overwrite");
}
