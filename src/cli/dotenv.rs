use crate::cli::globals::Environment;
use anyhow::{Context, Result};
use std::{
    io,
    path::{Path, PathBuf},
};

/// Load `.env.<environment>` from `dir` into the process environment.
///
/// Variables that are already set are left alone. A missing file is not an
/// error; returns the path that was loaded, if any.
///
/// # Errors
/// Returns an error if the file exists but can't be read or parsed.
pub fn load(environment: Environment, dir: &Path) -> Result<Option<PathBuf>> {
    let path = dir.join(environment.dotenv_file());

    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn missing_file_is_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(load(Environment::Production, dir.path())?, None);
        Ok(())
    }

    #[test]
    fn loads_file_for_environment() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(".env.production"),
            "JRCMS_DOTENV_TEST_PORT=4000\n",
        )?;
        fs::write(
            dir.path().join(".env.development"),
            "JRCMS_DOTENV_TEST_PORT=5000\n",
        )?;

        temp_env::with_var("JRCMS_DOTENV_TEST_PORT", None::<&str>, || -> Result<()> {
            let loaded = load(Environment::Production, dir.path())?;
            assert_eq!(loaded, Some(dir.path().join(".env.production")));
            assert_eq!(env::var("JRCMS_DOTENV_TEST_PORT").ok().as_deref(), Some("4000"));
            Ok(())
        })
    }

    #[test]
    fn existing_variables_win() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(".env.development"),
            "JRCMS_DOTENV_TEST_DSN=postgres://from-file\n",
        )?;

        temp_env::with_var(
            "JRCMS_DOTENV_TEST_DSN",
            Some("postgres://from-process"),
            || -> Result<()> {
                load(Environment::Development, dir.path())?;
                assert_eq!(
                    env::var("JRCMS_DOTENV_TEST_DSN").ok().as_deref(),
                    Some("postgres://from-process")
                );
                Ok(())
            },
        )
    }

    #[test]
    fn malformed_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(".env.development"), "NOT VALID LINE\n")?;

        temp_env::with_var("NOT", None::<&str>, || {
            assert!(load(Environment::Development, dir.path()).is_err());
        });
        Ok(())
    }
}
