use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use crate::query::PageLimits;

const DEFAULT_SNAPSHOT: &str = "data/videos.json";
const DEFAULT_PORT: u16 = 5001;

/// 命令行参数（优先级最高；环境变量等价于对应参数）
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "vidcat", version, about = "Video catalog query service")]
pub struct Cli {
    /// TOML 配置文件
    #[arg(long, env = "VIDCAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// 视频快照 JSON
    #[arg(long, env = "VIDCAT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    #[arg(long, env = "VIDCAT_BIND")]
    pub bind: Option<IpAddr>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    #[arg(long)]
    pub default_page_size: Option<NonZeroU32>,

    /// 单页上限（缺省不限制）
    #[arg(long)]
    pub max_page_size: Option<NonZeroU32>,
}

/// 配置文件内容，所有字段可选
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub snapshot: Option<PathBuf>,
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub default_page_size: Option<NonZeroU32>,
    pub max_page_size: Option<NonZeroU32>,
}

impl FileConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config file {:?}", path))
    }
}

/// 合并后的最终配置：CLI/env > 配置文件 > 内置默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub snapshot: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub page_limits: PageLimits,
}

impl Config {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let defaults = PageLimits::default();
        let page_limits = PageLimits {
            default_page_size: cli
                .default_page_size
                .or(file.default_page_size)
                .unwrap_or(defaults.default_page_size),
            max_page_size: cli.max_page_size.or(file.max_page_size),
        };
        if let Some(max) = page_limits.max_page_size {
            anyhow::ensure!(
                page_limits.default_page_size <= max,
                "default page size {} exceeds max page size {}",
                page_limits.default_page_size,
                max
            );
        }

        Ok(Self {
            snapshot: cli
                .snapshot
                .or(file.snapshot)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT)),
            bind: cli
                .bind
                .or(file.bind)
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            page_limits,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
