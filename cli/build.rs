use std::{
    env,
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::Command,
};

fn main() {
    println!("cargo:rerun-if-env-changed=UXENGINE_GIT_REVISION");
    if let Err(e) = write_version_files() {
        panic!("failed to create the version files: {:?}", e);
    }
}

fn env_path(key: &str) -> io::Result<PathBuf> {
    env::var(key)
        .map(PathBuf::from)
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, format!("{} not set", key)))
}

fn write_version_files() -> io::Result<()> {
    let out_dir = env_path("OUT_DIR")?;
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| String::from("0.0.0"));
    let target = env::var("TARGET").unwrap_or_else(|_| String::from("unknown"));

    let mut simple = File::create(out_dir.join("simple_version_string"))?;
    write!(&mut simple, "\"{}\"", version)?;

    let rev = git_revision().unwrap_or_else(|_| String::from("unknown"));
    let mut full = File::create(out_dir.join("version_string"))?;
    write!(
        &mut full,
        "r#\"{} ({})\nrev {}\"#",
        version,
        target,
        rev.trim()
    )?;
    Ok(())
}

fn git_revision() -> io::Result<String> {
    if let Ok(rev) = env::var("UXENGINE_GIT_REVISION") {
        return Ok(rev);
    }
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output();
    match out {
        Ok(out) if out.status.success() => String::from_utf8(out.stdout)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "git output was not UTF-8")),
        _ => revision_from_refs(),
    }
}

fn revision_from_refs() -> io::Result<String> {
    let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
    let head = Path::new(&manifest_dir).join("../.git/refs/heads/main");
    let mut rev = String::new();
    File::open(head)?.read_to_string(&mut rev)?;
    Ok(rev)
}
