//! Host description printed in the page footer.

use std::fs;
use std::process::Command;

use log::warn;

/// Returns a short description of the operating system the report is built on.
pub fn system_description() -> String {
    match std::env::consts::OS {
        "linux" => linux_description(),
        "macos" => macos_description(),
        "windows" => "Microsoft Windows".to_owned(),
        other => other.to_owned(),
    }
}

fn linux_description() -> String {
    if let Ok(data) = fs::read_to_string("/etc/os-release") {
        if let Some(description) = parse_os_release(&data) {
            return description;
        }
    }

    if let Ok(data) = fs::read_to_string("/etc/issue") {
        let line = clean_issue(&data);
        if !line.is_empty() {
            return line;
        }
    }

    warn!("No distribution information found, using generic system name");
    "Linux".to_owned()
}

/// Reads `PRETTY_NAME`, falling back to `NAME` and `VERSION`.
fn parse_os_release(data: &str) -> Option<String> {
    let mut name = None;
    let mut version = None;

    for line in data.lines() {
        if let Some(value) = line.strip_prefix("PRETTY_NAME=") {
            return Some(unquote(value).to_owned());
        }
        if let Some(value) = line.strip_prefix("NAME=") {
            name = Some(unquote(value).to_owned());
        }
        if let Some(value) = line.strip_prefix("VERSION=") {
            version = Some(unquote(value).to_owned());
        }
    }

    match (name, version) {
        (Some(name), Some(version)) => Some(format!("{} {}", name, version)),
        (Some(name), None) => Some(name),
        _ => None,
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// Strips getty escapes such as `\n` and `\l` from `/etc/issue`.
fn clean_issue(data: &str) -> String {
    data.trim().replace("\\n", "").replace("\\l", "").trim().to_owned()
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!text.is_empty()).then_some(text)
}

fn macos_description() -> String {
    let version = command_output("sw_vers", &["-productVersion"]);
    let model = command_output("system_profiler", &["SPHardwareDataType"])
        .and_then(|profile| parse_mac_model(&profile))
        .or_else(|| command_output("sysctl", &["-n", "hw.model"]));

    match (version, model) {
        (Some(version), Some(model)) => format!("macOS {} {}", version, model),
        (Some(version), None) => format!("macOS {}", version),
        (None, Some(model)) => format!("macOS on {}", model),
        (None, None) => "macOS".to_owned(),
    }
}

/// Prefers `Model Name` over `Model Identifier`.
fn parse_mac_model(profile: &str) -> Option<String> {
    let field = |key: &str| {
        profile.lines().find_map(|line| {
            line.trim()
                .strip_prefix(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        })
    };
    field("Model Name:").or_else(|| field("Model Identifier:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_name_wins() {
        let data = "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nVERSION=\"12\"\n";
        assert_eq!(
            parse_os_release(data).as_deref(),
            Some("Debian GNU/Linux 12 (bookworm)")
        );
    }

    #[test]
    fn name_and_version_fallback() {
        let data = "NAME=Alpine\nVERSION=\"3.19\"\n";
        assert_eq!(parse_os_release(data).as_deref(), Some("Alpine 3.19"));
        assert_eq!(parse_os_release("ID=x\n"), None);
    }

    #[test]
    fn issue_escapes_are_removed() {
        assert_eq!(clean_issue("Ubuntu 22.04 LTS \\n \\l\n"), "Ubuntu 22.04 LTS");
    }

    #[test]
    fn mac_model_name_is_preferred() {
        let profile = "Hardware:\n    Model Identifier: Mac14,2\n    Model Name: MacBook Air\n";
        assert_eq!(parse_mac_model(profile).as_deref(), Some("MacBook Air"));
    }
}
