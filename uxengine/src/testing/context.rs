#![allow(unused)]
use std::collections::HashMap;
use std::fs::{create_dir_all, OpenOptions};
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::Context as AnyhowContext;
use mockall::mock;
use once_cell::sync::OnceCell;
use rand::Rng;
use rstest::fixture;

use crate::config::Config;
use crate::context::{CONFIG_FILE_NAME, HOME_ENV};
use crate::utils::{ensure_dir_exists, path_must_str};
use crate::Context;

#[fixture]
pub fn tmp_context() -> TestContext {
    TestContext::default()
}

#[fixture]
pub fn mock_context() -> MockContext {
    MockContext::new()
}

#[fixture]
#[once]
pub fn global_tmp_context() -> TestContext {
    TestContext::default()
}

/// A [Context] rooted in a fresh temporary directory that doubles as the
/// home directory
pub struct TestContext {
    base_dir: PathBuf,
    env: HashMap<String, String>,
    config: OnceCell<Option<Config>>,
}

pub enum TreeEntry<'a> {
    Dir,
    EmptyFile,
    TxtFile(&'a str),
}

impl TestContext {
    pub fn set_env<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) -> &mut Self {
        self.env.insert(key.as_ref().into(), value.as_ref().into());
        self
    }

    /// Create a collection of files with the given names and contents
    ///
    /// The tree is rooted at the base directory
    pub fn create_tree(&self, tree: &[(&str, TreeEntry)]) -> anyhow::Result<()> {
        for (relative, content) in tree {
            let file = self.base_dir.join(relative);
            if let Some(parent) = file.parent() {
                if !parent.exists() {
                    create_dir_all(&parent)
                        .with_context(|| format!("creating parent dirs for {relative}"))?;
                }
            }

            match content {
                TreeEntry::Dir => {
                    fs::create_dir(&file).with_context(|| format!("creating dir {relative}"))?
                }
                TreeEntry::EmptyFile => {
                    OpenOptions::new()
                        .create_new(true)
                        .write(true)
                        .open(&file)
                        .with_context(|| format!("creating {relative}"))?;
                }
                TreeEntry::TxtFile(content) => fs::write(&file, content)
                    .with_context(|| format!("writing content to {relative}"))?,
            }
        }
        Ok(())
    }

    pub fn to_abs<P: AsRef<Path> + ?Sized>(&self, path: &P) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn get_temp_path(&self, suffix: Option<&str>) -> PathBuf {
        let mut rng = rand::thread_rng();
        let rand_name: u64 = rng.gen();
        let name = match suffix {
            Some(v) => format!("{}.{}", rand_name, v),
            None => rand_name.to_string(),
        };
        self.base_dir.join(name)
    }

    pub fn get_temp_dir(&self) -> PathBuf {
        self.get_temp_path(None)
    }

    pub fn new_tmp_file(&self, content: &str) -> anyhow::Result<PathBuf> {
        self.new_tmp_file_suffix(None, content)
    }

    pub fn new_tmp_file_suffix(
        &self,
        suffix: Option<&str>,
        content: &str,
    ) -> anyhow::Result<PathBuf> {
        let path = self.get_temp_path(suffix);
        fs::write(&path, content).with_context(|| "failed to write content to temp file")?;
        Ok(path)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let td = &self.base_dir;
        if td.exists() {
            fs::remove_dir_all(td).expect("failed to clear test dir");
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        let mut rng = rand::thread_rng();
        let rand_name: u64 = rng.gen();
        let td = env::temp_dir().join(format!("uxengine_test_base_{}", rand_name));

        if td.exists() {
            fs::remove_dir_all(&td).expect("failed to clear test dir");
        }
        ensure_dir_exists(&td).expect("failed to create default test dir");

        let mut env = HashMap::new();
        env.insert(HOME_ENV.into(), path_must_str(&td).into());

        Self {
            base_dir: td,
            env,
            config: OnceCell::new(),
        }
    }
}

impl Context for TestContext {
    fn maybe_get_env(&self, key: &str) -> Option<String> {
        self.env.get(key).map(String::from)
    }

    fn get_config<'a>(&'a self) -> crate::Result<Option<&'a Config>> {
        let cfg = self
            .config
            .get_or_try_init(|| -> crate::Result<Option<Config>> {
                let path = self.base_dir.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(None);
                }
                Ok(Some(Config::parse(&path)?))
            })?;
        Ok(cfg.as_ref())
    }
}

mock! {
    pub Context {

    }

    impl crate::Context for Context {
        fn maybe_get_env(&self, key: &str) -> Option<String>;
        fn get_config<'a>(&'a self) -> crate::Result<Option<&'a Config>>;
    }
}
