//! Reads the cluster's password and port back from its data directory.

use super::BoxError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::io::ErrorKind;
use std::path::Path;

fn open_dir(path: &Utf8Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| Box::new(err) as BoxError)
}

fn read_optional(dir: &Utf8Path, file_name: &str) -> Result<Option<String>, BoxError> {
    match open_dir(dir)?.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Box::new(err)),
    }
}

fn utf8(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_path = utf8(&settings.password_file);
    let password_path = Utf8Path::new(&password_path);
    let Some(file_name) = password_path.file_name() else {
        return Err(Box::new(std::io::Error::other(
            "password file path has no file name",
        )));
    };
    let parent = password_path.parent().unwrap_or_else(|| Utf8Path::new("."));
    if let Some(contents) = read_optional(parent, file_name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Copies the port the postmaster actually bound, as recorded on the
/// fourth line of `postmaster.pid`.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = utf8(&settings.data_dir);
    let Some(contents) = read_optional(Utf8Path::new(&data_dir), "postmaster.pid")? else {
        return Ok(());
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
