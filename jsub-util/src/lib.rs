#![warn(clippy::all)]

use lazy_static::lazy_static;

pub mod abs_path;
pub mod console;
mod macros;

use abs_path::AbsPathBuf;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

static APP_DIR_NAME: &str = "jsub";

lazy_static! {
    /// Directory for data that should persist between runs (account snapshot).
    pub static ref DATA_LOCAL_DIR: AbsPathBuf = {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .expect("Could not get home dir")
                    .join(".local")
                    .join("share")
            })
            .join(APP_DIR_NAME);
        AbsPathBuf::try_new(dir).expect("data local dir must be absolute")
    };
    /// Directory for the user config file.
    pub static ref CONFIG_DIR: AbsPathBuf = {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .expect("Could not get home dir")
                    .join(".config")
            })
            .join(APP_DIR_NAME);
        AbsPathBuf::try_new(dir).expect("config dir must be absolute")
    };
}
