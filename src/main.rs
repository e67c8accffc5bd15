use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use stormlog::config::{read_config, Config};
use stormlog::logger::configure_logger;
use stormlog::server::server_run;

const CFG_FILE_NAME: &str = "stormlog.toml";

const CONFIG_SAMPLE: &str = r#"[content_store]
project_id = "your-project-id"
dataset = "production"
# api_host = "api.sanity.io"
# api_version = "2021-10-21"

[server]
address = "0.0.0.0"
port = 8001

# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
template_dir = "${exe_dir}/template"
public_dir = "${exe_dir}/public"

# How long a rendered post page is served before a background refresh
[cache]
revalidate_secs = 60

# [log]
# level = "Info"
# log_to_console = true
# location = "/var/log/stormlog/server.log"

# [feed]
# title = "My blog"
# site_url = "https://blog.example.com"
# description = "Posts from my blog"
"#;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Write a sample stormlog.toml to the current directory and exit
    #[arg(long)]
    init_config: bool,
}

fn get_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().unwrap();
    let exe_dir = exe_path.parent().unwrap();
    let cur_dir = env::current_dir().unwrap();

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    let cfg_dir = dirs::config_dir().expect("Could not find user config dir");
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = cfg_path.unwrap_or(match get_config_path() {
        None => return Err("Could not find Stormlog configuration".to_string()),
        Some(x) => x,
    });

    println!("Reading config from {}", config_path.to_str().unwrap());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        let location = log.location.unwrap_or_else(|| {
            dirs::cache_dir().unwrap().join("Stormlog").join("log").join("server.log")
        });
        log.location = Some(location);
        println!("Log enabled. Files will be written in {}", log.location.as_ref().unwrap().to_str().unwrap());
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

fn write_sample_cfg(file_path: &PathBuf) {
    let mut file = File::create(file_path).unwrap();
    file.write_all(CONFIG_SAMPLE.as_bytes()).unwrap();
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let target = env::current_dir().unwrap().join(CFG_FILE_NAME);
        write_sample_cfg(&target);
        println!("Sample configuration written to {}", target.to_str().unwrap());
        return Ok(());
    }

    let config_path = args.config_path.map(PathBuf::from);
    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run stormlog --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting Stormlog =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);

    server_run(config).await
}
