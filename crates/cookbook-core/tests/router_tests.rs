//! End-to-end routing against a real child process.
//!
//! `/bin/sh -c <script> sh` stands in for the recipe tool: the resolved
//! canonical arguments arrive as `$1..$n`.

#![cfg(unix)]

use std::fs;
use std::path::PathBuf;

use cookbook_core::{AliasRouter, AliasTable, Config, Error, ToolCommand};
use tempfile::TempDir;

fn sh_tool(script: &str) -> ToolCommand {
    ToolCommand::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string(), "sh".to_string()],
    )
}

const NO_ARGS: &[&str] = &[];

#[test]
fn external_failure_status_is_relayed() {
    let router = AliasRouter::new(AliasTable::builtin(), sh_tool("exit 2"));

    let err = router.invoke("recipe-list", NO_ARGS).unwrap_err();
    assert!(matches!(err, Error::ExternalTool { exit_code: 2 }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn child_receives_resolved_arguments() {
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("argv.txt");
    let script = format!("printf '%s\\n' \"$@\" > '{}'", out.display());
    let router = AliasRouter::new(AliasTable::builtin(), sh_tool(&script));

    let result = router.invoke("recipe-edit", &["5", "--verbose"]).unwrap();
    assert_eq!(result.exit_code, 0);

    let argv = fs::read_to_string(&out).unwrap();
    assert_eq!(argv, "recipe\nedit\n--id\n5\n--verbose\n");
}

#[test]
fn arguments_with_spaces_stay_single_tokens() {
    let router = AliasRouter::new(
        AliasTable::builtin(),
        sh_tool("[ \"$#\" -eq 3 ] && [ \"$3\" = 'pumpkin puree, black beans' ]"),
    );
    assert!(router.invoke("recipe-cook", &["pumpkin puree, black beans"]).is_ok());
}

#[test]
fn missing_interpreter_is_reported_without_spawning() {
    let router = AliasRouter::new(
        AliasTable::builtin(),
        ToolCommand::native(PathBuf::from("/nonexistent/venv/bin/python")),
    );
    assert!(matches!(
        router.invoke("backup", NO_ARGS),
        Err(Error::ExecutableNotFound(_))
    ));
}

#[test]
fn router_built_from_config_on_disk() {
    let root = TempDir::new().unwrap();
    let bin = root.path().join("venv/bin");
    fs::create_dir_all(&bin).unwrap();
    // The venv "python" is a symlink to sh, the "script" a shell script
    std::os::unix::fs::symlink("/bin/sh", bin.join("python")).unwrap();
    fs::write(
        root.path().join("cli.py"),
        "[ \"$1\" = stats ] && exit 0\nexit 3\n",
    )
    .unwrap();

    let config_path = root.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "project_root: {}\naliases:\n  - name: db-stats\n    canonical: [stats]\n",
            root.path().display()
        ),
    )
    .unwrap();

    let config: Config = cookbook_core::config::load_config(&config_path).unwrap();
    let tool = ToolCommand::discover(&config).unwrap();
    assert_eq!(tool.program, bin.join("python"));

    let router = AliasRouter::new(config.alias_table(&[]).unwrap(), tool);
    assert_eq!(router.invoke("db-stats", NO_ARGS).unwrap().exit_code, 0);
    assert!(matches!(
        router.invoke("backup", NO_ARGS),
        Err(Error::ExternalTool { exit_code: 3 })
    ));
}
