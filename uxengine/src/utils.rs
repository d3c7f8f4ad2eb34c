use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Calls `to_str` on the path and returns the string, panicking if that fails
pub fn path_must_str(path: &Path) -> &str {
    path.to_str().expect("valid paths")
}

pub fn ensure_dir_exists(p: &Path) -> io::Result<()> {
    if p.exists() {
        return Ok(());
    }
    fs::create_dir_all(p)
}

/// Read the file as a string, mapping a missing file to [crate::Error::MissingFile]
pub fn read_file(path: &Path) -> crate::Result<String> {
    match fs::read_to_string(path) {
        Ok(v) => Ok(v),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Err(crate::Error::MissingFile(path_must_str(path).into())),
            _ => Err(e.into()),
        },
    }
}

/// Like [read_file] but a missing file is just `None`
pub fn maybe_read_file(path: &Path) -> crate::Result<Option<String>> {
    match read_file(path) {
        Ok(v) => Ok(Some(v)),
        Err(crate::Error::MissingFile(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{tmp_context, TestContext};
    use rstest::*;

    #[rstest]
    fn test_maybe_read_file(tmp_context: TestContext) {
        let missing = tmp_context.get_temp_path(Some("txt"));
        assert!(maybe_read_file(&missing).expect("missing is ok").is_none());
        assert!(matches!(
            read_file(&missing),
            Err(crate::Error::MissingFile(_))
        ));

        let present = tmp_context
            .new_tmp_file("hello")
            .expect("failed to write tmp file");
        assert_eq!(
            maybe_read_file(&present).expect("reading file"),
            Some(String::from("hello"))
        );
    }
}
