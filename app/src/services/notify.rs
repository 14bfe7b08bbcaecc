//! Desktop toast notifications for channels that went live.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::live_status::Broadcaster;
use crate::services::profile_image::ProfileImages;

const APP_NAME: &str = "Twitch Channel Point Farmer";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: &'static str,
        code: Option<i32>,
        stderr: String,
    },
}

/// One-shot "channel is live" notification.
#[async_trait(?Send)]
pub trait Notifier {
    async fn notify(&self, broadcaster: &Broadcaster, title: &str) -> Result<(), NotifyError>;
}

/// Host platforms with a toast implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }
}

/// Program and arguments that show a toast on `platform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

pub fn heading_for(broadcaster: &Broadcaster) -> String {
    format!("{} is live! Go farm some points!", broadcaster.display_name)
}

pub fn toast_command(platform: Platform, heading: &str, body: &str, icon: Option<&Path>) -> ToastCommand {
    match platform {
        Platform::Linux => {
            let mut args = vec![
                "--app-name".to_string(),
                APP_NAME.to_string(),
                "--expire-time".to_string(),
                "7000".to_string(),
            ];
            if let Some(icon) = icon {
                args.push("--icon".into());
                args.push(icon.display().to_string());
            }
            args.push(heading.to_string());
            args.push(body.to_string());
            ToastCommand {
                program: "notify-send",
                args,
            }
        }
        Platform::MacOs => {
            let script = format!(
                "display notification {} with title {} subtitle {}",
                applescript_string(body),
                applescript_string(APP_NAME),
                applescript_string(heading),
            );
            ToastCommand {
                program: "osascript",
                args: vec!["-e".into(), script],
            }
        }
        Platform::Windows => {
            let image = icon
                .map(|p| {
                    format!(
                        "$template.GetElementsByTagName('image').Item(0).Attributes.GetNamedItem('src').NodeValue = {}\n",
                        powershell_string(&p.display().to_string())
                    )
                })
                .unwrap_or_default();
            let script = format!(
                "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null\n\
                 $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastImageAndText02)\n\
                 $text = $template.GetElementsByTagName('text')\n\
                 $text.Item(0).AppendChild($template.CreateTextNode({heading})) > $null\n\
                 $text.Item(1).AppendChild($template.CreateTextNode({body})) > $null\n\
                 {image}\
                 $toast = [Windows.UI.Notifications.ToastNotification]::new($template)\n\
                 [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier({app}).Show($toast)\n",
                heading = powershell_string(heading),
                body = powershell_string(body),
                app = powershell_string(APP_NAME),
            );
            ToastCommand {
                program: "powershell",
                args: vec![
                    "-NoProfile".into(),
                    "-NonInteractive".into(),
                    "-Command".into(),
                    script,
                ],
            }
        }
    }
}

fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn powershell_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Shows toasts through the host's notification command, with the
/// streamer's cached profile picture as icon.
pub struct DesktopNotifier {
    platform: Platform,
    images: Option<ProfileImages>,
}

impl DesktopNotifier {
    pub fn new(images: Option<ProfileImages>) -> Self {
        Self {
            platform: Platform::current(),
            images,
        }
    }

    fn icon_for(&self, login: &str) -> Option<PathBuf> {
        let path = self.images.as_ref()?.existing(login)?;
        std::path::absolute(&path).ok().or(Some(path))
    }
}

#[async_trait(?Send)]
impl Notifier for DesktopNotifier {
    async fn notify(&self, broadcaster: &Broadcaster, title: &str) -> Result<(), NotifyError> {
        let heading = heading_for(broadcaster);
        let icon = self.icon_for(&broadcaster.login);
        let cmd = toast_command(self.platform, &heading, title, icon.as_deref());

        let output = tokio::process::Command::new(cmd.program)
            .args(&cmd.args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| NotifyError::Spawn {
                program: cmd.program,
                source,
            })?;

        if !output.status.success() {
            return Err(NotifyError::Failed {
                program: cmd.program,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!(login = %broadcaster.login, "Notification sent!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lirik() -> Broadcaster {
        Broadcaster {
            login: "lirik".into(),
            display_name: "LIRIK".into(),
        }
    }

    #[test]
    fn heading_uses_display_name() {
        assert_eq!(heading_for(&lirik()), "LIRIK is live! Go farm some points!");
    }

    #[test]
    fn linux_passes_icon_heading_and_body_as_separate_args() {
        let cmd = toast_command(
            Platform::Linux,
            "LIRIK is live!",
            "chill stream",
            Some(Path::new("/tmp/pfp/profile_image_lirik.png")),
        );
        assert_eq!(cmd.program, "notify-send");
        let icon_at = cmd.args.iter().position(|a| a == "--icon").unwrap();
        assert_eq!(cmd.args[icon_at + 1], "/tmp/pfp/profile_image_lirik.png");
        assert_eq!(cmd.args[cmd.args.len() - 2], "LIRIK is live!");
        assert_eq!(cmd.args[cmd.args.len() - 1], "chill stream");
    }

    #[test]
    fn macos_escapes_quotes_in_titles() {
        let cmd = toast_command(Platform::MacOs, "x", r#"say "hi" \o/"#, None);
        assert_eq!(cmd.program, "osascript");
        assert!(cmd.args[1].contains(r#"display notification "say \"hi\" \\o/""#));
    }

    #[test]
    fn windows_doubles_single_quotes() {
        let cmd = toast_command(Platform::Windows, "it's live", "body", None);
        assert_eq!(cmd.program, "powershell");
        let script = cmd.args.last().unwrap();
        assert!(script.contains("CreateTextNode('it''s live')"));
        assert!(!script.contains("GetNamedItem('src')"));
    }
}
