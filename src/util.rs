use std::env;
use std::io;
use std::process::Command as ProcessCommand;

pub(crate) fn env_required(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let value = env::var(name).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Missing {name}")).into());
    }
    Ok(value)
}

pub(crate) fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub(crate) fn command_wrapper() -> Option<Vec<String>> {
    env_optional("VIDVAULT_COMMAND_WRAPPER").map(|raw| {
        raw.split_whitespace()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    })
}

pub(crate) fn build_external_command(program: &str, args: &[String]) -> ProcessCommand {
    let mut cmd = if let Some(wrapper) = command_wrapper() {
        let mut c = ProcessCommand::new(&wrapper[0]);
        c.args(&wrapper[1..]).arg(program).args(args);
        c
    } else {
        let mut c = ProcessCommand::new(program);
        c.args(args);
        c
    };

    // Process group isolation: the child becomes its own process group leader
    // so we can kill the entire tree without affecting the parent.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd
}

/// Kill a child process and its entire process group.
/// On Unix, sends SIGTERM first for graceful shutdown, then SIGKILL after 2 seconds.
#[cfg(unix)]
pub(crate) fn kill_process_tree(child: &mut std::process::Child) {
    let pid = child.id() as i32;
    // SIGTERM the group first (graceful)
    unsafe {
        libc::kill(-pid, libc::SIGTERM);
    }
    // Give 2 seconds for graceful shutdown
    std::thread::sleep(std::time::Duration::from_secs(2));
    // SIGKILL if still running
    match child.try_wait() {
        Ok(Some(_)) => {}
        _ => unsafe {
            libc::killpg(pid, libc::SIGKILL);
        },
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
pub(crate) fn kill_process_tree(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Last `limit` characters of `text`, never splitting a code point.
pub(crate) fn tail_chars(text: &str, limit: usize) -> &str {
    let total = text.chars().count();
    if total <= limit {
        return text;
    }
    match text.char_indices().nth(total - limit) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}
