// Whole-launch runs through `Launcher::run`, kept offline by seeding the
// artifact cache up front.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use thinjar::core::config::Config;
use thinjar::core::launch::Launcher;
use thinjar::core::maven::MavenArtifact;
use thinjar::LauncherError;

fn launcher(args: &[String]) -> Launcher {
    Launcher::new(Config::from_args(args), args.to_vec())
}

fn seed_cache(cache: &Path, coord: &str) {
    let artifact: MavenArtifact = coord.parse().unwrap();
    let jar = cache.join(artifact.repository_path());
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    fs::write(&jar, b"jar").unwrap();
    let pom = cache.join(artifact.with_packaging("pom").repository_path());
    fs::write(&pom, "<project></project>").unwrap();
}

#[test]
fn classpath_mode_with_no_dependencies_exits_zero() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    fs::create_dir_all(app.join("META-INF")).unwrap();
    fs::write(
        app.join("META-INF/MANIFEST.MF"),
        "Main-Class: com.example.App\r\n",
    )
    .unwrap();

    let args = vec![
        "--thin.classpath".to_string(),
        format!("--thin.archive={}", app.display()),
        format!("--thin.root={}", temp.path().join("cache").display()),
    ];
    assert_eq!(launcher(&args).run().unwrap(), 0);
}

#[test]
fn dryrun_resolves_entirely_from_the_cache() {
    let temp = TempDir::new().unwrap();
    let cache = temp.path().join("cache");
    seed_cache(&cache, "com.example:cached:1.0");

    let app = temp.path().join("app");
    fs::create_dir_all(app.join("META-INF")).unwrap();
    fs::write(
        app.join("META-INF/thin.properties"),
        "dependencies.cached=com.example:cached:1.0\n",
    )
    .unwrap();

    let args = vec![
        "--thin.dryrun".to_string(),
        format!("--thin.archive={}", app.display()),
        format!("--thin.root={}", cache.display()),
    ];
    assert_eq!(launcher(&args).run().unwrap(), 0);
}

#[test]
fn execute_without_an_entry_point_fails_before_spawning() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    fs::create_dir_all(&app).unwrap();

    let args = vec![
        format!("--thin.archive={}", app.display()),
        format!("--thin.root={}", temp.path().join("cache").display()),
    ];
    let err = launcher(&args).run().unwrap_err();
    assert!(matches!(err, LauncherError::EntryPointNotFound(_)));
}

#[test]
fn bad_flag_value_names_the_offending_key() {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("app");
    fs::create_dir_all(&app).unwrap();

    let args = vec![
        "--thin.dryrun=yes-please".to_string(),
        format!("--thin.archive={}", app.display()),
        format!("--thin.root={}", temp.path().join("cache").display()),
    ];
    let err = launcher(&args).run().unwrap_err();
    assert!(err.to_string().contains("thin.dryrun"));
}
