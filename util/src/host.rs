//! Host platform (linux for example) utility functions

use std::path::PathBuf;

use uname;

/// Environment variable giving the root of the turret software directory.
pub const SW_ROOT_ENV_VAR: &str = "TURRET_SW_ROOT";

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the turret software root directory from the `TURRET_SW_ROOT`
/// environment variable.
pub fn get_turret_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
