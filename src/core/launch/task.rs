// ─── Launch Task ───
// Spawns the application JVM with the assembled classpath.

use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::core::classpath::Classpath;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java;

/// Run `java -cp <classpath> <main_class> <args…>` and wait for it,
/// returning the child's exit code. Stdio is inherited so the application
/// owns the terminal.
pub fn launch(classpath: &Classpath, main_class: &str, args: &[String]) -> LauncherResult<i32> {
    let java_binary = java::find_java_binary()?;
    let cp = classpath.launch_string();

    let mut command = Command::new(&java_binary);
    command
        .arg("-cp")
        .arg(&cp)
        .arg(main_class)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!("Launching {} via {:?}", main_class, java_binary);
    debug!("Command: {}", format_command_for_logs(&command));

    let status = command
        .status()
        .map_err(|e| LauncherError::JavaExecution(format!("failed to start java: {e}")))?;

    let code = status.code().unwrap_or(1);
    if code == 0 {
        debug!("Application exited cleanly");
    } else {
        info!("Application exited with code {}", code);
    }
    Ok(code)
}

/// Readable single-line rendering of a command, for debug logs only.
fn format_command_for_logs(command: &Command) -> String {
    let mut rendered = shell_escape(&command.get_program().to_string_lossy());
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&shell_escape(&arg.to_string_lossy()));
    }
    rendered
}

fn shell_escape(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./:=@".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_stay_unquoted() {
        assert_eq!(shell_escape("com.example.App"), "com.example.App");
        assert_eq!(shell_escape("/usr/bin/java"), "/usr/bin/java");
    }

    #[test]
    fn values_with_spaces_are_quoted() {
        assert_eq!(shell_escape("a b"), "'a b'");
        assert_eq!(shell_escape(""), "''");
        assert_eq!(shell_escape("it's"), "'it'\\''s'");
    }

    #[test]
    fn command_rendering_includes_all_args() {
        let mut command = Command::new("java");
        command.arg("-cp").arg("a.jar:b.jar").arg("com.example.App");
        let rendered = format_command_for_logs(&command);
        assert_eq!(rendered, "java -cp a.jar:b.jar com.example.App");
    }
}
