//! Server configuration.
//!
//! `ServeArgs` is the clap-parsed command line; `Settings` is the validated
//! form the server runs with. The working directory is resolved here once and
//! passed down, so handlers never read the process cwd themselves.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use crate::auth::Auth;
use crate::exec::ScriptSet;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "8888")]
    pub port: u16,

    /// URL prefix the /jupyter-fs routes are mounted under
    #[arg(long, env = "JUPYTER_FS_BASE_URL", default_value = "/")]
    pub base_url: String,

    /// Token clients must present
    #[arg(long, env = "JUPYTER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Serve without authentication
    #[arg(long)]
    pub no_auth: bool,

    /// Directory the scripts run in (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory holding the scripts, relative to the working directory
    #[arg(long, value_name = "DIR", default_value = "./jupyter_fs/script")]
    pub script_dir: PathBuf,

    /// File name of the commit script
    #[arg(long, default_value = "commit.sh")]
    pub commit_script: String,

    /// File name of the revert script
    #[arg(long, default_value = "revert.sh")]
    pub revert_script: String,

    /// Program used to run the scripts
    #[arg(long, default_value = "bash")]
    pub interpreter: String,

    /// Answer 502 when a script exits non-zero
    #[arg(long)]
    pub strict_exit: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub auth: Auth,
    pub work_dir: PathBuf,
    pub scripts: ScriptSet,
    pub strict_exit: bool,
}

impl Settings {
    pub fn from_args(args: &ServeArgs) -> anyhow::Result<Self> {
        let auth = match (&args.token, args.no_auth) {
            (Some(token), false) if !token.is_empty() => Auth::Token(token.clone()),
            (_, true) => Auth::Disabled,
            _ => bail!("no token configured: pass --token, set JUPYTER_TOKEN, or use --no-auth"),
        };

        let work_dir = match &args.work_dir {
            Some(dir) => std::fs::canonicalize(dir)
                .with_context(|| format!("working directory {} is not accessible", dir.display()))?,
            None => std::env::current_dir().context("cannot determine current directory")?,
        };

        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            base_url: normalize_base_url(&args.base_url),
            auth,
            work_dir,
            scripts: ScriptSet::new(
                args.interpreter.clone(),
                &args.script_dir,
                &args.commit_script,
                &args.revert_script,
            ),
            strict_exit: args.strict_exit,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ensures a single leading and trailing slash: `user/a` becomes `/user/a/`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
