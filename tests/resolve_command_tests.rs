use assert_cmd::prelude::*;
use predicates::prelude::*;

mod common;
use common::{assertions, repository::*};

#[cfg(test)]
mod resolve_command_tests {
    use super::*;

    #[test]
    fn test_resolve_replaces_root_directory_with_stream() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?
            .args([
                "resolve",
                "--root",
                r"C:\proj\",
                "--stream",
                "main",
                r"C:\proj\src\a.cs",
            ])
            .assert()
            .success()
            .stdout(assertions::resolves_to(r"C:\proj\src\a.cs", "main/src/a.cs"));

        Ok(())
    }

    #[test]
    fn test_resolve_without_stream_keeps_root_name() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?
            .args(["resolve", "--root", "/w/proj", "/w/proj/docs/readme.md"])
            .assert()
            .success()
            .stdout(assertions::resolves_to(
                "/w/proj/docs/readme.md",
                "proj/docs/readme.md",
            ));

        Ok(())
    }

    #[test]
    fn test_resolve_is_case_insensitive() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?
            .args([
                "resolve",
                "--root",
                r"C:\Proj",
                "--stream",
                "main",
                r"c:\PROJ\Src\A.cs",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("main/Src/A.cs"));

        Ok(())
    }

    #[test]
    fn test_resolve_outside_root_warns() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?
            .args(["resolve", "--root", "/w/proj", "/other/x.txt"])
            .assert()
            .success()
            .stdout(predicate::str::contains("not under the backend root"))
            .stderr(assertions::not_under_root());

        Ok(())
    }

    #[test]
    fn test_resolve_follows_configured_drive_mapping() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?
            .args(["config", "--map-drive", r"X:=C:\proj"])
            .assert()
            .success();

        repo.command()?
            .args([
                "resolve",
                "--root",
                r"C:\proj",
                "--stream",
                "main",
                r"X:\src\a.cs",
            ])
            .assert()
            .success()
            .stdout(assertions::resolves_to(r"X:\src\a.cs", "main/src/a.cs"));

        Ok(())
    }

    #[test]
    fn test_resolve_without_root_passes_through() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let elsewhere = tempfile::TempDir::new()?;

        repo.command()?
            .current_dir(elsewhere.path())
            .args(["resolve", "/any/where.txt"])
            .assert()
            .success()
            .stdout(assertions::resolves_to("/any/where.txt", "/any/where.txt"))
            .stderr(predicate::str::contains("No backend root configured"));

        Ok(())
    }

    #[test]
    fn test_resolve_requires_paths() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;

        repo.command()?.arg("resolve").assert().failure();

        Ok(())
    }
}
